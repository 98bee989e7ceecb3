//! Error types for the Chequeflow core library.

use crate::error_info::ErrorInfo;

/// Errors that can occur while driving the cheque issuance wizard.
///
/// Remote failures travel as [`ErrorInfo`] inside trackers; this type covers
/// everything that is rejected locally before or around a remote call.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Client-side input validation failed; no call was issued.
    #[error("Validation error: {message}")]
    Validation {
        /// Field or aspect that failed validation
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// A normalised remote failure surfaced outside a tracker.
    #[error("API error: {0}")]
    Api(Box<ErrorInfo>),

    /// The operation needs a `request_id` but the workflow has not been initialised.
    #[error("No request_id has been minted for this workflow")]
    MissingRequestId,

    /// A second `request_id` was offered for a workflow that already has one.
    #[error("Workflow already bound to request {current}")]
    RequestIdAlreadyMinted {
        /// The request id the workflow is bound to
        current: String,
    },

    /// I/O error (device id file, configuration file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },
}

/// Convenience `Result` type alias for Chequeflow operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns whether re-issuing the same action could succeed.
    ///
    /// Only API errors carry a retry hint, and that hint is server-supplied.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Api(info) => info.retryable,
            Error::Io(_) => true,
            Error::Validation { .. } => false,
            Error::MissingRequestId => false,
            Error::RequestIdAlreadyMinted { .. } => false,
            Error::Serialization(_) => false,
            Error::Config { .. } => false,
        }
    }

    /// Creates a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a new validation error with a field name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}

impl From<ErrorInfo> for Error {
    fn from(info: ErrorInfo) -> Self {
        Error::Api(Box::new(info))
    }
}
