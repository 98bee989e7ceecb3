//! Error types for chq-client

use thiserror::Error;

/// Result type alias for chq-client setup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building a client.
///
/// Calls against the gateway never return this type; they return
/// [`chq_core::ErrorInfo`] through [`ApiResult`](crate::ApiResult).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from chq-core
    #[error("Core error: {0}")]
    Core(#[from] chq_core::Error),

    /// HTTP client construction error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Device id file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
