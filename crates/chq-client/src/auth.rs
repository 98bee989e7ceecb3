//! Credentials attached to every gateway call.
//!
//! Provides:
//! - [`TokenProvider`]: source of the current access token (storage is someone else's job)
//! - [`StaticToken`] / [`EnvToken`]: the two providers the CLI ships with
//! - [`DeviceIdStore`]: the persisted client-generated device UUID

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chq_core::DeviceId;

/// Yields the current access token, if any.
///
/// Called once per request; implementations may refresh behind the scenes.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// The token to send as `Authorization: Bearer`, or `None` to omit the header.
    async fn access_token(&self) -> Option<String>;
}

/// A fixed token.
#[derive(Debug, Clone)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    /// Always yields `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// Never yields a token.
    pub fn anonymous() -> Self {
        Self(None)
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Reads the token from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    /// Reads from `var`.
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Name of the variable being read.
    pub fn var(&self) -> &str {
        &self.var
    }
}

#[async_trait]
impl TokenProvider for EnvToken {
    async fn access_token(&self) -> Option<String> {
        std::env::var(&self.var)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Loads or creates the device id file.
#[derive(Debug, Clone)]
pub struct DeviceIdStore {
    path: PathBuf,
}

impl DeviceIdStore {
    /// A store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the user's data directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("chequeflow").join("device-id"))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored id, generating and persisting one on first use.
    ///
    /// A file that exists but does not hold a UUID is replaced.
    pub fn load_or_create(&self) -> crate::Result<DeviceId> {
        if let Ok(contents) = std::fs::read_to_string(&self.path) {
            if let Ok(id) = contents.parse::<DeviceId>() {
                tracing::debug!(path = %self.path.display(), device_id = %id, "Loaded device id");
                return Ok(id);
            }
            tracing::warn!(path = %self.path.display(), "Device id file is corrupt, regenerating");
        }

        let id = DeviceId::new();
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, id.to_string())?;
        tracing::info!(path = %self.path.display(), device_id = %id, "Created device id");
        Ok(id)
    }
}
