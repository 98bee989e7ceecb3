//! Hardware/browser back handling.
//!
//! Screens register what "back" means for them while they are visible. The
//! registrations form a stack: the most recent one wins, and removing an
//! entry from the middle leaves the others in place. With nothing
//! registered, back walks in-app history, and closes the web view once
//! there is no history left.

use chq_core::ScreenId;
use chq_host::{HostAction, HostAdapter, HostOutcome, Navigation, Route};
use serde_json::Value;

use crate::router::ScreenRouter;
use crate::store::{StoreAction, WorkflowStore};

/// An in-app history move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteChange {
    /// One entry back
    Back,
    /// One entry forward
    Forward,
    /// Push a route
    To(Route),
}

/// What "back" should do.
#[derive(Debug, Clone, PartialEq)]
pub enum BackAction {
    /// Dispatch exactly this store transition
    State(StoreAction),
    /// Move in in-app history
    Route(RouteChange),
    /// Ask the host; navigate to `fallback` when there is none
    Host {
        /// Host action to invoke
        action: HostAction,
        /// Action parameters
        params: Value,
        /// In-app route used without a host
        fallback: Route,
    },
}

impl BackAction {
    /// Closes the web view, or returns to the start screen in a plain browser.
    pub fn close() -> Self {
        BackAction::Host {
            action: HostAction::Close,
            params: Value::Null,
            fallback: ScreenRouter::route(ScreenId::Start),
        }
    }

    /// What back does on `screen` unless something more specific is registered.
    pub fn default_for(screen: ScreenId) -> Option<Self> {
        let to = |screen| Some(BackAction::State(StoreAction::SetScreen(screen)));
        match screen {
            ScreenId::Accounts | ScreenId::SayadExternal => to(ScreenId::Start),
            ScreenId::Checkbooks => to(ScreenId::Accounts),
            ScreenId::Sheets => to(ScreenId::Checkbooks),
            ScreenId::Status => to(ScreenId::Sheets),
            ScreenId::Confirm => to(ScreenId::Upload),
            ScreenId::ExternalInquiry => to(ScreenId::SayadExternal),
            ScreenId::Delivery | ScreenId::BankConfirmation | ScreenId::DeliveryInfo => {
                Some(BackAction::close())
            }
            ScreenId::Start | ScreenId::Upload => None,
        }
    }
}

/// Handle returned by [`BackStack::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DelegateId(u64);

/// What a back press did.
#[derive(Debug, Clone, PartialEq)]
pub enum BackOutcome {
    /// A store transition was dispatched
    Dispatched(StoreAction),
    /// In-app history moved, or had nowhere to go
    Navigated(Option<Navigation>),
    /// A registered host action was invoked
    Host(HostOutcome),
    /// Nothing was registered and history was empty, so the host was asked to close
    Closed(HostOutcome),
}

/// Stack of back registrations.
#[derive(Debug, Clone, Default)]
pub struct BackStack {
    entries: Vec<(DelegateId, BackAction)>,
    next_id: u64,
}

impl BackStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `action`; it takes effect until unregistered or shadowed.
    pub fn register(&mut self, action: BackAction) -> DelegateId {
        self.next_id += 1;
        let id = DelegateId(self.next_id);
        self.entries.push((id, action));
        id
    }

    /// Removes the entry with `id` wherever it sits. Returns `false` if it was already gone.
    pub fn unregister(&mut self, id: DelegateId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The entry that would handle back right now.
    pub fn top(&self) -> Option<&BackAction> {
        self.entries.last().map(|(_, action)| action)
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Handles a back press.
    ///
    /// A `State` entry touches nothing but the store; the others touch
    /// nothing but the host adapter.
    pub fn resolve(&self, store: &mut WorkflowStore, host: &mut HostAdapter) -> BackOutcome {
        match self.top() {
            Some(BackAction::State(action)) => {
                tracing::debug!(action = ?action, "Back dispatches store action");
                store.dispatch(*action);
                BackOutcome::Dispatched(*action)
            }
            Some(BackAction::Route(change)) => {
                let navigation = match change {
                    RouteChange::Back => host.back(),
                    RouteChange::Forward => host.forward(),
                    RouteChange::To(route) => Some(host.navigate_in_app(route.clone())),
                };
                BackOutcome::Navigated(navigation)
            }
            Some(BackAction::Host {
                action,
                params,
                fallback,
            }) => {
                let message = action.to_message(params.clone());
                BackOutcome::Host(host.deliver(message, fallback.clone()))
            }
            None if host.can_go_back() => BackOutcome::Navigated(host.back()),
            None => {
                tracing::info!("Back with empty history, closing");
                BackOutcome::Closed(host.close(ScreenRouter::route(ScreenId::Start)))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chq_host::NoopBridge;

    fn host() -> HostAdapter {
        HostAdapter::new(Box::new(NoopBridge))
    }

    #[test]
    fn test_most_recent_registration_wins() {
        let mut stack = BackStack::new();
        stack.register(BackAction::State(StoreAction::PreviousStep));
        let top = stack.register(BackAction::State(StoreAction::PreviousScreen));

        assert_eq!(stack.top(), Some(&BackAction::State(StoreAction::PreviousScreen)));
        assert!(stack.unregister(top));
        assert!(!stack.unregister(top));
        assert_eq!(stack.top(), Some(&BackAction::State(StoreAction::PreviousStep)));
    }

    #[test]
    fn test_unregister_from_middle_keeps_top() {
        let mut stack = BackStack::new();
        let bottom = stack.register(BackAction::Route(RouteChange::Back));
        let middle = stack.register(BackAction::Route(RouteChange::Forward));
        stack.register(BackAction::close());

        stack.unregister(middle);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.top(), Some(&BackAction::close()));
        stack.unregister(bottom);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_state_entry_only_touches_store() {
        let mut stack = BackStack::new();
        stack.register(BackAction::State(StoreAction::SetScreen(ScreenId::Accounts)));
        let mut store = WorkflowStore::new();
        let mut host = host();

        let outcome = stack.resolve(&mut store, &mut host);

        assert_eq!(
            outcome,
            BackOutcome::Dispatched(StoreAction::SetScreen(ScreenId::Accounts))
        );
        assert_eq!(store.screen(), ScreenId::Accounts);
        assert!(host.history().is_empty());
    }

    #[test]
    fn test_host_entry_falls_back_without_host() {
        let mut stack = BackStack::new();
        stack.register(BackAction::close());
        let mut store = WorkflowStore::new();
        let mut host = host();

        let outcome = stack.resolve(&mut store, &mut host);

        assert_eq!(
            outcome,
            BackOutcome::Host(HostOutcome::FellBack(ScreenRouter::route(ScreenId::Start)))
        );
        assert_eq!(store, WorkflowStore::new());
    }

    #[test]
    fn test_empty_stack_pops_history_then_closes() {
        let stack = BackStack::new();
        let mut store = WorkflowStore::new();
        let mut host = host();
        host.navigate_in_app(Route::new("/cheque/start"));
        host.navigate_in_app(Route::new("/cheque/accounts"));

        let outcome = stack.resolve(&mut store, &mut host);
        assert!(matches!(
            outcome,
            BackOutcome::Navigated(Some(ref nav)) if nav.route.path == "/cheque/start"
        ));

        let outcome = stack.resolve(&mut store, &mut host);
        assert!(matches!(outcome, BackOutcome::Closed(HostOutcome::FellBack(_))));
    }

    #[test]
    fn test_default_back_per_screen() {
        assert_eq!(
            BackAction::default_for(ScreenId::Checkbooks),
            Some(BackAction::State(StoreAction::SetScreen(ScreenId::Accounts)))
        );
        assert_eq!(BackAction::default_for(ScreenId::DeliveryInfo), Some(BackAction::close()));
        assert_eq!(BackAction::default_for(ScreenId::Start), None);
    }
}
