//! The host adapter the wizard talks to.
//!
//! Every host request carries a fallback route. When the wizard is not
//! embedded, or the bridge fails to deliver, the adapter navigates to the
//! fallback in-app instead; callers never see an error.

use serde_json::{Value, json};

use crate::bridge::{HostBridge, HostMessage};
use crate::navigator::{Route, RouteHistory};
use crate::triggers::RouteTriggerTable;

/// What happened to a host request.
#[derive(Debug, Clone, PartialEq)]
pub enum HostOutcome {
    /// The host received the message.
    Delivered(HostMessage),
    /// The fallback route was navigated to instead.
    FellBack(Route),
}

/// Result of one in-app navigation event.
#[derive(Debug, Clone, PartialEq)]
pub struct Navigation {
    /// Where the app ended up
    pub route: Route,
    /// One outcome per trigger that fired
    pub triggered: Vec<HostOutcome>,
}

/// Host bridge plus in-app history and route triggers.
pub struct HostAdapter {
    bridge: Box<dyn HostBridge>,
    history: RouteHistory,
    triggers: RouteTriggerTable,
}

impl std::fmt::Debug for HostAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostAdapter")
            .field("platform", &self.bridge.platform())
            .field("history", &self.history)
            .field("triggers", &self.triggers.len())
            .finish()
    }
}

impl HostAdapter {
    /// Creates an adapter with no triggers.
    pub fn new(bridge: Box<dyn HostBridge>) -> Self {
        Self {
            bridge,
            history: RouteHistory::new(),
            triggers: RouteTriggerTable::new(),
        }
    }

    /// Installs the trigger table.
    pub fn with_triggers(mut self, triggers: RouteTriggerTable) -> Self {
        self.triggers = triggers;
        self
    }

    /// Whether a native shell is present.
    pub fn is_embedded(&self) -> bool {
        self.bridge.is_embedded()
    }

    /// In-app history.
    pub fn history(&self) -> &RouteHistory {
        &self.history
    }

    /// Current in-app route.
    pub fn current_route(&self) -> Option<&Route> {
        self.history.current()
    }

    /// Asks the host to close the web view.
    pub fn close(&mut self, fallback: Route) -> HostOutcome {
        self.deliver(HostMessage::CloseWebView, fallback)
    }

    /// Asks the host to open the native screen `screen`.
    ///
    /// The screen name travels as `params.screen`; object params keep their
    /// other keys, anything else is nested under `params.params`.
    pub fn open(&mut self, screen: &str, params: Value, fallback: Route) -> HostOutcome {
        let params = match params {
            Value::Object(mut map) => {
                map.insert("screen".to_string(), Value::String(screen.to_string()));
                Value::Object(map)
            }
            Value::Null => json!({ "screen": screen }),
            other => json!({ "screen": screen, "params": other }),
        };
        self.deliver(HostMessage::OpenNativeApp { params }, fallback)
    }

    /// Asks the host to navigate to a native route.
    pub fn navigate(&mut self, route: impl Into<String>, params: Value, fallback: Route) -> HostOutcome {
        self.deliver(
            HostMessage::NavigateToNative {
                route: route.into(),
                params,
            },
            fallback,
        )
    }

    /// Sends `message`, or navigates to `fallback` when it cannot be delivered.
    ///
    /// The fallback navigation does not consult the trigger table.
    pub fn deliver(&mut self, message: HostMessage, fallback: Route) -> HostOutcome {
        if !self.bridge.is_embedded() {
            tracing::debug!(method = message.method(), fallback = %fallback, "No host, using fallback route");
            return self.fall_back(fallback);
        }
        match self.bridge.send(&message) {
            Ok(()) => {
                tracing::info!(method = message.method(), "Host message delivered");
                HostOutcome::Delivered(message)
            }
            Err(err) => {
                tracing::warn!(
                    method = message.method(),
                    error = %err,
                    fallback = %fallback,
                    "Host delivery failed, using fallback route"
                );
                self.fall_back(fallback)
            }
        }
    }

    fn fall_back(&mut self, fallback: Route) -> HostOutcome {
        self.history.push(fallback.clone());
        HostOutcome::FellBack(fallback)
    }

    /// Navigates in-app to `route` and fires matching triggers.
    pub fn navigate_in_app(&mut self, route: Route) -> Navigation {
        self.history.push(route.clone());
        self.arrive(route)
    }

    /// Moves back in in-app history, firing triggers for the new route.
    pub fn back(&mut self) -> Option<Navigation> {
        let route = self.history.back()?.clone();
        Some(self.arrive(route))
    }

    /// Moves forward in in-app history, firing triggers for the new route.
    pub fn forward(&mut self) -> Option<Navigation> {
        let route = self.history.forward()?.clone();
        Some(self.arrive(route))
    }

    /// Forgets in-app history, e.g. when the workflow restarts.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Whether in-app history has somewhere to go back to.
    pub fn can_go_back(&self) -> bool {
        self.history.can_go_back()
    }

    fn arrive(&mut self, route: Route) -> Navigation {
        let fired: Vec<(HostMessage, Route)> = self
            .triggers
            .matching(&route.path)
            .map(|(trigger, message)| (message, trigger.fallback.clone()))
            .collect();

        let triggered = fired
            .into_iter()
            .map(|(message, fallback)| {
                tracing::debug!(path = %route.path, method = message.method(), "Route trigger fired");
                self.deliver(message, fallback)
            })
            .collect();

        Navigation { route, triggered }
    }
}
