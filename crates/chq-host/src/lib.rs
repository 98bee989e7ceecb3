#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Chequeflow host integration.

pub mod adapter;
pub mod bridge;
pub mod detect;
pub mod error;
pub mod navigator;
pub mod triggers;

// Re-exports for convenience
pub use adapter::{HostAdapter, HostOutcome, Navigation};
pub use bridge::{
    AndroidBridge, HostBridge, HostChannel, HostMessage, HostPlatform, LogChannel, NoopBridge,
    RecordingChannel, WebKitBridge,
};
pub use detect::{DetectionConfig, HostEnvironment, detect};
pub use error::{Error, Result};
pub use navigator::{Route, RouteHistory};
pub use triggers::{HostAction, RoutePattern, RouteTrigger, RouteTriggerTable};
