mod back_properties;
mod store_properties;
