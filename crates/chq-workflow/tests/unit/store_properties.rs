//! Property tests for store transitions.

use chq_client::models;
use chq_core::{ErrorInfo, ErrorKind, ScreenId, WorkflowStep};
use chq_workflow::{Operation, Payload, StoreAction, WorkflowStore};
use proptest::prelude::*;

pub fn step() -> impl Strategy<Value = WorkflowStep> {
    (0..WorkflowStep::ORDER.len()).prop_map(|i| WorkflowStep::ORDER[i])
}

pub fn screen() -> impl Strategy<Value = ScreenId> {
    (0..ScreenId::ORDER.len()).prop_map(|i| ScreenId::ORDER[i])
}

pub fn operation() -> impl Strategy<Value = Operation> {
    (0..Operation::ALL.len()).prop_map(|i| Operation::ALL[i])
}

pub fn action() -> impl Strategy<Value = StoreAction> {
    prop_oneof![
        step().prop_map(StoreAction::SetStep),
        screen().prop_map(StoreAction::SetScreen),
        Just(StoreAction::NextStep),
        Just(StoreAction::PreviousStep),
        Just(StoreAction::NextScreen),
        Just(StoreAction::PreviousScreen),
        operation().prop_map(StoreAction::ClearTracker),
    ]
}

#[derive(Debug, Clone)]
enum Event {
    Dispatch(StoreAction),
    Pending(Operation),
    SettleLast(bool),
}

fn event() -> impl Strategy<Value = Event> {
    prop_oneof![
        action().prop_map(Event::Dispatch),
        Just(Event::Pending(Operation::ImagesInfo)),
        Just(Event::Pending(Operation::AccountsList)),
        any::<bool>().prop_map(Event::SettleLast),
    ]
}

fn payload(op: Operation) -> Payload {
    match op {
        Operation::ImagesInfo => Payload::ImagesInfo(models::ImagesInfo::default()),
        _ => Payload::AccountsList(models::AccountList::default()),
    }
}

proptest! {
    #[test]
    fn test_clear_all_always_returns_to_initial(events in prop::collection::vec(event(), 0..40)) {
        let mut store = WorkflowStore::new();
        store.set_request_id("abc123".into()).unwrap();
        let mut tickets = Vec::new();

        for event in events {
            match event {
                Event::Dispatch(action) => store.dispatch(action),
                Event::Pending(op) => tickets.push(store.pending(op)),
                Event::SettleLast(ok) => {
                    if let Some(ticket) = tickets.pop() {
                        if ok {
                            store.fulfilled(ticket, payload(ticket.operation()));
                        } else {
                            store.rejected(ticket, ErrorInfo::new(ErrorKind::Network, "offline"));
                        }
                    }
                }
            }
        }

        store.clear_all();
        prop_assert_eq!(store.step(), WorkflowStep::Init);
        prop_assert_eq!(store.screen(), ScreenId::Start);
        prop_assert!(store.request_id().is_none());
        for op in Operation::ALL {
            prop_assert!(store.trackers().is_initial(*op));
        }

        // Anything still in flight settles as stale.
        for ticket in tickets {
            prop_assert!(!store.fulfilled(ticket, payload(ticket.operation())).is_applied());
        }
    }

    #[test]
    fn test_screen_moves_stay_in_range(start in screen(), moves in prop::collection::vec(any::<bool>(), 0..40)) {
        let mut store = WorkflowStore::new();
        store.set_screen(start);
        for forward in moves {
            let before = store.screen();
            let moved = if forward { store.next_screen() } else { store.previous_screen() };
            prop_assert!(store.screen().index() < ScreenId::ORDER.len());
            if !moved {
                prop_assert_eq!(store.screen(), before);
            }
        }
    }

    #[test]
    fn test_settled_trackers_never_hold_data_and_error(events in prop::collection::vec(event(), 0..40)) {
        let mut store = WorkflowStore::new();
        let mut tickets = Vec::new();
        for event in events {
            match event {
                Event::Dispatch(action) => store.dispatch(action),
                Event::Pending(op) => tickets.push(store.pending(op)),
                Event::SettleLast(ok) => {
                    if let Some(ticket) = tickets.pop() {
                        if ok {
                            store.fulfilled(ticket, payload(ticket.operation()));
                        } else {
                            store.rejected(ticket, ErrorInfo::new(ErrorKind::Http, "boom"));
                        }
                    }
                }
            }
            for op in Operation::ALL {
                let status = store.trackers().status(*op);
                prop_assert!(!(status.has_data && status.error.is_some()));
            }
        }
    }
}

#[test]
fn test_step_moves_are_idempotent_at_ends() {
    let mut store = WorkflowStore::new();
    store.previous_step();
    assert_eq!(store.step(), WorkflowStep::Init);

    store.set_step(WorkflowStep::ConfirmPhysic);
    store.next_step();
    assert_eq!(store.step(), WorkflowStep::ConfirmPhysic);
}
