#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Chequeflow gateway client.
//!
//! See [`GatewayClient`] for the endpoint surface.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod mock;
pub mod models;
pub mod normalize;
pub mod transport;

// Re-exports for convenience
pub use auth::{DeviceIdStore, EnvToken, StaticToken, TokenProvider};
pub use client::{ApiResult, GatewayClient, ImageSide};
pub use config::GatewayConfig;
pub use error::{Error, Result};
pub use headers::ClientIdentity;
pub use mock::MockTransport;
pub use transport::{
    HttpRequest, HttpResponse, Method, RequestBody, ReqwestTransport, Transport, TransportError,
    TransportErrorKind,
};
