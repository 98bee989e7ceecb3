//! The normalised failure record every tracker stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of failure an [`ErrorInfo`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorKind {
    /// No response arrived (DNS, refused connection, TLS, reset).
    Network,
    /// The request did not complete in time.
    Timeout,
    /// The server answered with a non-success status and no business code.
    Http,
    /// The server answered with a business error code.
    Business,
    /// A success response whose body could not be decoded.
    Decode,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Network => write!(f, "network"),
            ErrorKind::Timeout => write!(f, "timeout"),
            ErrorKind::Http => write!(f, "http"),
            ErrorKind::Business => write!(f, "business"),
            ErrorKind::Decode => write!(f, "decode"),
        }
    }
}

/// A remote failure after normalisation at the gateway boundary.
///
/// Nothing past the gateway ever sees the raw transport error or the
/// server's alternative field spellings; they are folded into this one shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Failure category
    pub kind: ErrorKind,

    /// User-facing message (business message, or the status fallback text)
    pub message: String,

    /// Message produced by the transport layer, if any
    pub transport_message: Option<String>,

    /// HTTP status, when a response arrived
    pub status: Option<u16>,

    /// Server-issued business code (e.g. `CQMS-10033`)
    pub code: Option<String>,

    /// Server-supplied retry hint; absent means `false`
    pub retryable: bool,

    /// Extra structured details from the server
    pub details: Option<serde_json::Value>,

    /// The full decoded error body
    pub response: Option<serde_json::Value>,

    /// Request URL
    pub url: Option<String>,

    /// Request method
    pub method: Option<String>,

    /// When the failure was normalised
    pub timestamp: DateTime<Utc>,
}

impl ErrorInfo {
    /// Creates a bare error record of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            transport_message: None,
            status: None,
            code: None,
            retryable: false,
            details: None,
            response: None,
            url: None,
            method: None,
            timestamp: Utc::now(),
        }
    }

    /// Creates a business error carrying a server code.
    pub fn business(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::new(ErrorKind::Business, message)
        }
    }

    /// Sets the HTTP status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the retry hint.
    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Records the request the failure belongs to.
    pub fn with_request(mut self, method: impl Into<String>, url: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self.url = Some(url.into());
        self
    }

    /// Returns `true` if the server code equals `code`.
    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.code, self.status) {
            (Some(code), _) => write!(f, "[{code}] {}", self.message),
            (None, Some(status)) => write!(f, "HTTP {status}: {}", self.message),
            (None, None) => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for ErrorInfo {}
