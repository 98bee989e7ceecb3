//! Property tests for the back stack.

use chq_host::{HostAdapter, NoopBridge};
use chq_workflow::{BackAction, BackOutcome, BackStack, WorkflowStore};
use proptest::prelude::*;

use super::store_properties::{action, screen, step};

proptest! {
    #[test]
    fn test_state_entry_applies_exactly_that_transition(
        registered in action(),
        at_step in step(),
        at_screen in screen()
    ) {
        let mut store = WorkflowStore::new();
        store.set_request_id("abc123".into()).unwrap();
        store.set_step(at_step);
        store.set_screen(at_screen);
        let mut expected = store.clone();
        expected.dispatch(registered);

        let mut stack = BackStack::new();
        stack.register(BackAction::State(registered));
        let mut host = HostAdapter::new(Box::new(NoopBridge));

        let outcome = stack.resolve(&mut store, &mut host);

        prop_assert_eq!(outcome, BackOutcome::Dispatched(registered));
        prop_assert_eq!(store, expected);
        prop_assert!(host.history().is_empty());
        prop_assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_unregister_removes_only_that_entry(count in 1usize..10, pick in 0usize..10) {
        let mut stack = BackStack::new();
        let ids: Vec<_> = (0..count)
            .map(|_| stack.register(BackAction::close()))
            .collect();
        let pick = pick % count;

        prop_assert!(stack.unregister(ids[pick]));
        prop_assert_eq!(stack.len(), count - 1);
        prop_assert!(!stack.unregister(ids[pick]));
    }
}
