//! Error types for chq-cli

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for chq-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in chq-cli
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from chq-core
    #[error("Core error: {0}")]
    Core(#[from] chq_core::Error),

    /// Error from chq-client
    #[error("Client error: {0}")]
    Client(#[from] chq_client::Error),

    /// Error from chq-host
    #[error("Host error: {0}")]
    Host(#[from] chq_host::Error),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong
        message: String,
    },

    /// File access error
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// JSON output could not be produced
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Creates a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Wraps an I/O error with the path it happened on.
    pub fn io_with_path(source: std::io::Error, path: &Path) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_path() {
        let err = Error::io_with_path(
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            Path::new("/tmp/chq.toml"),
        );
        let text = err.to_string();
        assert!(text.contains("/tmp/chq.toml"));
        assert!(text.contains("missing"));
    }

    #[test]
    fn test_core_error_converts() {
        let err: Error = chq_core::Error::MissingRequestId.into();
        assert!(matches!(err, Error::Core(_)));
    }
}
