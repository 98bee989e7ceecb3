//! Core types for the cheque issuance wizard.

mod ids;
mod proptests;
mod screen;
mod step;

pub use ids::{DeviceId, RequestId, TraceNumber};
pub use screen::{Branch, ScreenId};
pub use step::WorkflowStep;
