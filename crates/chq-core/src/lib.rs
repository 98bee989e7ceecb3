#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Chequeflow Core Library
//!
//! Types, errors and trackers shared by the gateway client, the host bridge
//! and the workflow store.

pub mod error;
pub mod error_info;
pub mod tracker;
pub mod types;
pub mod validation;

// Re-exports for convenience
pub use error::{Error, Result};
pub use error_info::{ErrorInfo, ErrorKind};
pub use tracker::{AsyncOperationState, Settlement, TrackerStatus};
pub use types::{Branch, DeviceId, RequestId, ScreenId, TraceNumber, WorkflowStep};
