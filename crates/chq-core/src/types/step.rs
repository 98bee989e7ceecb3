//! Business stages of a cheque issuance request.

use serde::{Deserialize, Serialize};

/// The business stage the backend reports for a workflow instance.
///
/// Steps only change through explicit transitions; the screen a user is
/// looking at never implies a step.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStep {
    /// Request created, nothing selected yet.
    #[default]
    Init,
    /// Waiting for cheque images.
    Upload,
    /// Images uploaded, waiting to be sent for review.
    SendImage,
    /// Images accepted by the bank.
    ConfirmImage,
    /// Images rejected by the bank.
    RejectImage,
    /// Cheque being issued through another bank.
    ExternalIssue,
    /// Cheque being issued internally.
    InternalIssue,
    /// Physical cheque ready to be handed over.
    ReadyForDelivery,
    /// Physical cheque handed over.
    Delivery,
    /// Physical cheque rejected by the counterpart bank.
    RejectPhysic,
    /// Physical cheque confirmed.
    ConfirmPhysic,
}

impl WorkflowStep {
    /// Fixed order used by `next` / `previous`.
    pub const ORDER: [WorkflowStep; 11] = [
        WorkflowStep::Init,
        WorkflowStep::Upload,
        WorkflowStep::SendImage,
        WorkflowStep::ConfirmImage,
        WorkflowStep::RejectImage,
        WorkflowStep::ExternalIssue,
        WorkflowStep::InternalIssue,
        WorkflowStep::ReadyForDelivery,
        WorkflowStep::Delivery,
        WorkflowStep::RejectPhysic,
        WorkflowStep::ConfirmPhysic,
    ];

    /// Position in [`ORDER`](Self::ORDER).
    pub fn index(self) -> usize {
        Self::ORDER
            .iter()
            .position(|s| *s == self)
            .unwrap_or_default()
    }

    /// The following step, or `self` at the end of the order.
    pub fn next(self) -> Self {
        Self::ORDER
            .get(self.index() + 1)
            .copied()
            .unwrap_or(self)
    }

    /// The preceding step, or `self` at the start of the order.
    pub fn previous(self) -> Self {
        self.index()
            .checked_sub(1)
            .and_then(|i| Self::ORDER.get(i).copied())
            .unwrap_or(self)
    }

    /// Returns `true` for steps after which the workflow cannot proceed.
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowStep::RejectPhysic | WorkflowStep::ConfirmPhysic)
    }

    /// Wire name of the step.
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStep::Init => "INIT",
            WorkflowStep::Upload => "UPLOAD",
            WorkflowStep::SendImage => "SEND_IMAGE",
            WorkflowStep::ConfirmImage => "CONFIRM_IMAGE",
            WorkflowStep::RejectImage => "REJECT_IMAGE",
            WorkflowStep::ExternalIssue => "EXTERNAL_ISSUE",
            WorkflowStep::InternalIssue => "INTERNAL_ISSUE",
            WorkflowStep::ReadyForDelivery => "READY_FOR_DELIVERY",
            WorkflowStep::Delivery => "DELIVERY",
            WorkflowStep::RejectPhysic => "REJECT_PHYSIC",
            WorkflowStep::ConfirmPhysic => "CONFIRM_PHYSIC",
        }
    }
}

impl std::fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkflowStep {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ORDER
            .iter()
            .copied()
            .find(|step| step.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| crate::Error::validation_field("step", format!("unknown step '{s}'")))
    }
}
