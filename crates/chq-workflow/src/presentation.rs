//! What a screen should show for a tracker.
//!
//! Rendering is out of scope; this module only decides which of the
//! loading, failure, empty and loaded views applies and which recovery
//! actions the user is offered.

use chq_core::{ErrorInfo, ScreenId, TrackerStatus, WorkflowStep};
use serde::Serialize;

/// Business code for "no chequebook is available on this account".
pub const NO_CHEQUEBOOK: &str = "CQMS-10033";

/// A recovery action offered next to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RecoveryAction {
    /// Re-issue the failed call
    Retry,
    /// Acknowledge and move to the screen's fallback
    Confirm {
        /// Where to go
        target: ScreenId,
    },
    /// Restart the workflow
    ReturnToStart,
}

/// View of one tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum OperationView {
    /// Never started
    Idle,
    /// In flight
    Loading,
    /// Failed with a recoverable or terminal error
    Failed {
        /// Message to show
        message: String,
        /// Business code, if any
        code: Option<String>,
        /// What the user may do
        actions: Vec<RecoveryAction>,
    },
    /// A terminal "nothing to work with" state
    Empty {
        /// Message to show
        message: String,
        /// What the user may do
        actions: Vec<RecoveryAction>,
    },
    /// Data is available
    Loaded,
}

impl OperationView {
    /// Derives the view for a tracker shown on a screen whose confirm target is `fallback`.
    pub fn from_status(status: &TrackerStatus<'_>, fallback: ScreenId) -> Self {
        if status.is_loading {
            return OperationView::Loading;
        }
        if let Some(error) = status.error {
            return Self::from_error(error, fallback);
        }
        if status.has_data {
            OperationView::Loaded
        } else {
            OperationView::Idle
        }
    }

    /// Derives the failure view for `error`.
    pub fn from_error(error: &ErrorInfo, fallback: ScreenId) -> Self {
        if error.has_code(NO_CHEQUEBOOK) {
            return OperationView::Empty {
                message: error.message.clone(),
                actions: vec![RecoveryAction::ReturnToStart],
            };
        }
        let confirm = RecoveryAction::Confirm { target: fallback };
        let actions = if error.retryable {
            vec![RecoveryAction::Retry, confirm]
        } else {
            vec![confirm]
        };
        OperationView::Failed {
            message: error.message.clone(),
            code: error.code.clone(),
            actions,
        }
    }

    /// Whether the view leaves no way forward except leaving the screen.
    pub fn is_terminal(&self) -> bool {
        match self {
            OperationView::Failed { actions, .. } | OperationView::Empty { actions, .. } => {
                !actions.contains(&RecoveryAction::Retry)
            }
            _ => false,
        }
    }

    /// Recovery actions offered, if any.
    pub fn actions(&self) -> &[RecoveryAction] {
        match self {
            OperationView::Failed { actions, .. } | OperationView::Empty { actions, .. } => actions,
            _ => &[],
        }
    }
}

/// Overall state of the cheque request, as far as the step tells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// Still moving through the wizard
    InProgress,
    /// The cheque was physically confirmed
    Completed,
    /// The physical cheque was rejected; nothing further can be done
    Rejected,
}

impl From<WorkflowStep> for StepOutcome {
    fn from(step: WorkflowStep) -> Self {
        match step {
            WorkflowStep::ConfirmPhysic => StepOutcome::Completed,
            WorkflowStep::RejectPhysic => StepOutcome::Rejected,
            _ => StepOutcome::InProgress,
        }
    }
}
