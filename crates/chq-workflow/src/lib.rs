#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Chequeflow workflow orchestration.
//!
//! The [`Wizard`] ties the [`WorkflowStore`], the [`ScreenRouter`], the
//! [`BackStack`] and the host adapter to the gateway client.

pub mod back;
pub mod call;
pub mod operations;
pub mod presentation;
pub mod router;
pub mod store;
pub mod wizard;

// Re-exports for convenience
pub use back::{BackAction, BackOutcome, BackStack, DelegateId, RouteChange};
pub use call::Call;
pub use operations::{Operation, Payload, Trackers};
pub use presentation::{NO_CHEQUEBOOK, OperationView, RecoveryAction, StepOutcome};
pub use router::{ROUTE_PREFIX, ScreenDescriptor, ScreenRouter};
pub use store::{StoreAction, Ticket, WorkflowStore};
pub use wizard::{Applied, Completion, PendingCall, UploadView, Wizard};
