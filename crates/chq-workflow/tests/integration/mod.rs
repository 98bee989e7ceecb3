mod external_flow;
mod host_navigation;
mod internal_flow;
