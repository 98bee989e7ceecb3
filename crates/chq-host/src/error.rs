//! Error types for chq-host

use thiserror::Error;

/// Result type alias for chq-host operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by host bridges and route patterns.
///
/// [`HostAdapter`](crate::HostAdapter) swallows delivery errors and falls
/// back; these surface only to code that talks to a bridge directly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// No native host is present.
    #[error("Not running inside a native host")]
    NotEmbedded,

    /// The host channel rejected a message.
    #[error("Failed to deliver '{target}': {message}")]
    Delivery {
        /// Interface method or message handler
        target: String,
        /// Channel-supplied reason
        message: String,
    },

    /// A route pattern could not be compiled.
    #[error("Invalid route pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// What is wrong with it
        message: String,
    },
}

impl Error {
    /// Creates a delivery error.
    pub fn delivery(target: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Delivery {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Creates a pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}
