//! Async operation tracking.
//!
//! One [`AsyncOperationState`] exists per named remote operation. A call
//! moves it through `start` and then exactly one of `succeed` / `fail`.
//! Each `start` hands out a generation number; settling with an older
//! generation is discarded, so a slow earlier call can never overwrite the
//! result of a newer one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error_info::ErrorInfo;

/// Outcome of trying to settle a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The completion belonged to the current call and was recorded.
    Applied,
    /// The completion belonged to a superseded call and was dropped.
    Stale {
        /// Generation the tracker is currently at
        current: u64,
        /// Generation carried by the completion
        received: u64,
    },
}

impl Settlement {
    /// Returns `true` if the completion was recorded.
    pub fn is_applied(&self) -> bool {
        matches!(self, Settlement::Applied)
    }
}

/// Loading / error / data state for one remote operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsyncOperationState<T> {
    is_loading: bool,
    error: Option<ErrorInfo>,
    data: Option<T>,
    last_fetched: Option<DateTime<Utc>>,
    #[serde(skip)]
    generation: u64,
}

impl<T> Default for AsyncOperationState<T> {
    fn default() -> Self {
        Self {
            is_loading: false,
            error: None,
            data: None,
            last_fetched: None,
            generation: 0,
        }
    }
}

impl<T> AsyncOperationState<T> {
    /// Creates an idle tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a call is in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// The last failure, if the last settled call failed.
    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    /// The last payload, if the last settled call succeeded.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// When the last successful payload arrived.
    pub fn last_fetched(&self) -> Option<DateTime<Utc>> {
        self.last_fetched
    }

    /// Generation of the most recent `start`.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` if the tracker holds no loading flag, data, error or timestamp.
    pub fn is_initial(&self) -> bool {
        !self.is_loading && self.error.is_none() && self.data.is_none() && self.last_fetched.is_none()
    }

    /// Marks a call as in flight and returns its generation.
    ///
    /// Prior data and error are kept; callers that want a clean slate call
    /// [`clear`](Self::clear) first.
    pub fn start(&mut self) -> u64 {
        self.generation += 1;
        self.is_loading = true;
        self.generation
    }

    /// Records a successful payload for the call started at `generation`.
    pub fn succeed(&mut self, generation: u64, payload: T) -> Settlement {
        if generation != self.generation {
            return self.stale(generation);
        }
        self.is_loading = false;
        self.data = Some(payload);
        self.error = None;
        self.last_fetched = Some(Utc::now());
        Settlement::Applied
    }

    /// Records a failure for the call started at `generation`.
    pub fn fail(&mut self, generation: u64, error: ErrorInfo) -> Settlement {
        if generation != self.generation {
            return self.stale(generation);
        }
        self.is_loading = false;
        self.error = Some(error);
        self.data = None;
        Settlement::Applied
    }

    /// Drops data and error without touching the loading flag.
    pub fn clear(&mut self) {
        self.data = None;
        self.error = None;
    }

    /// Returns to the initial snapshot.
    ///
    /// The generation keeps counting so that completions of calls started
    /// before the reset are discarded.
    pub fn reset(&mut self) {
        let generation = self.generation + 1;
        *self = Self::default();
        self.generation = generation;
    }

    /// Borrows a data-free view of the tracker.
    pub fn status(&self) -> TrackerStatus<'_> {
        TrackerStatus {
            is_loading: self.is_loading,
            error: self.error.as_ref(),
            has_data: self.data.is_some(),
            last_fetched: self.last_fetched,
        }
    }

    fn stale(&self, received: u64) -> Settlement {
        tracing::debug!(
            current = self.generation,
            received,
            "Discarding completion from superseded call"
        );
        Settlement::Stale {
            current: self.generation,
            received,
        }
    }
}

/// Type-erased view of a tracker, used where the payload type is not known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerStatus<'a> {
    /// Whether a call is in flight
    pub is_loading: bool,
    /// The last failure
    pub error: Option<&'a ErrorInfo>,
    /// Whether a payload is held
    pub has_data: bool,
    /// When the payload arrived
    pub last_fetched: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error_info::ErrorKind;
    use proptest::prelude::*;

    fn failure() -> ErrorInfo {
        ErrorInfo::new(ErrorKind::Http, "boom").with_status(500)
    }

    #[test]
    fn test_new_tracker_is_initial() {
        let tracker: AsyncOperationState<u32> = AsyncOperationState::new();
        assert!(tracker.is_initial());
        assert_eq!(tracker.generation(), 0);
    }

    #[test]
    fn test_start_preserves_prior_data() {
        let mut tracker = AsyncOperationState::new();
        let g = tracker.start();
        tracker.succeed(g, 7u32);

        tracker.start();
        assert!(tracker.is_loading());
        assert_eq!(tracker.data(), Some(&7));
    }

    #[test]
    fn test_succeed_clears_error_and_stamps_time() {
        let mut tracker = AsyncOperationState::new();
        let g = tracker.start();
        tracker.fail(g, failure());

        let g = tracker.start();
        assert!(tracker.succeed(g, 1u32).is_applied());
        assert!(!tracker.is_loading());
        assert!(tracker.error().is_none());
        assert_eq!(tracker.data(), Some(&1));
        assert!(tracker.last_fetched().is_some());
    }

    #[test]
    fn test_fail_clears_data() {
        let mut tracker = AsyncOperationState::new();
        let g = tracker.start();
        tracker.succeed(g, 1u32);

        let g = tracker.start();
        tracker.fail(g, failure());
        assert!(tracker.data().is_none());
        assert_eq!(tracker.error().unwrap().status, Some(500));
    }

    #[test]
    fn test_clear_keeps_loading_flag() {
        let mut tracker = AsyncOperationState::<u8>::new();
        let g = tracker.start();
        tracker.fail(g, failure());
        tracker.start();

        tracker.clear();
        assert!(tracker.is_loading());
        assert!(tracker.error().is_none());
        assert!(tracker.data().is_none());
    }

    #[test]
    fn test_out_of_order_completion_is_discarded() {
        let mut tracker = AsyncOperationState::new();
        let first = tracker.start();
        let second = tracker.start();

        assert!(tracker.succeed(second, "new").is_applied());
        let late = tracker.succeed(first, "old");

        assert_eq!(
            late,
            Settlement::Stale {
                current: second,
                received: first
            }
        );
        assert_eq!(tracker.data(), Some(&"new"));
    }

    #[test]
    fn test_reset_discards_completions_from_before() {
        let mut tracker = AsyncOperationState::new();
        let g = tracker.start();
        tracker.reset();

        assert!(tracker.is_initial());
        assert!(!tracker.succeed(g, 3u8).is_applied());
        assert!(tracker.is_initial());
    }

    #[test]
    fn test_status_view() {
        let mut tracker = AsyncOperationState::new();
        let g = tracker.start();
        tracker.succeed(g, 5u8);
        let status = tracker.status();
        assert!(status.has_data);
        assert!(!status.is_loading);
        assert!(status.error.is_none());
    }

    proptest! {
        #[test]
        fn test_settled_tracker_never_holds_data_and_error(outcomes in prop::collection::vec(any::<bool>(), 1..32)) {
            let mut tracker = AsyncOperationState::new();
            for ok in outcomes {
                let g = tracker.start();
                if ok {
                    tracker.succeed(g, 1u8);
                } else {
                    tracker.fail(g, failure());
                }
                prop_assert!(!tracker.is_loading());
                prop_assert!(!(tracker.data().is_some() && tracker.error().is_some()));
            }
        }

        #[test]
        fn test_only_latest_generation_settles(starts in 1usize..8, pick in 0usize..8) {
            let mut tracker = AsyncOperationState::new();
            let generations: Vec<u64> = (0..starts).map(|_| tracker.start()).collect();
            let pick = pick % starts;
            let applied = tracker.succeed(generations[pick], pick).is_applied();
            prop_assert_eq!(applied, pick == starts - 1);
        }
    }
}
