//! Property-based tests for core types.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::types::{RequestId, ScreenId, WorkflowStep};
    use proptest::prelude::*;

    fn any_step() -> impl Strategy<Value = WorkflowStep> {
        prop::sample::select(WorkflowStep::ORDER.to_vec())
    }

    fn any_screen() -> impl Strategy<Value = ScreenId> {
        prop::sample::select(ScreenId::ORDER.to_vec())
    }

    proptest! {
        #[test]
        fn test_request_id_roundtrip(s in "\\PC+") {
            let id = RequestId::new(s.clone());
            assert_eq!(id.as_str(), &s);
        }

        #[test]
        fn test_step_walk_stays_in_range(start in any_step(), moves in prop::collection::vec(any::<bool>(), 0..40)) {
            let mut step = start;
            for forward in moves {
                step = if forward { step.next() } else { step.previous() };
                prop_assert!(step.index() < WorkflowStep::ORDER.len());
            }
        }

        #[test]
        fn test_step_display_parse_roundtrip(step in any_step()) {
            let parsed: WorkflowStep = step.to_string().parse().unwrap();
            prop_assert_eq!(parsed, step);
        }

        #[test]
        fn test_screen_display_parse_roundtrip(screen in any_screen()) {
            let parsed: ScreenId = screen.to_string().parse().unwrap();
            prop_assert_eq!(parsed, screen);
        }
    }
}
