//! Correlation and identity headers.

use chq_core::{DeviceId, TraceNumber};
use serde::{Deserialize, Serialize};

/// Header carrying the persisted device id.
pub const DEVICE_ID: &str = "device-id";
/// Header carrying the per-call trace number.
pub const TRACE_NUMBER: &str = "trace-number";
/// Header carrying the client version.
pub const CLIENT_VERSION: &str = "client-version";
/// Header carrying the client type.
pub const CLIENT_TYPE: &str = "client-type";
/// Header carrying the app version.
pub const APP_VERSION: &str = "app-version";
/// Header carrying the gateway type.
pub const GATEWAY_TYPE: &str = "gateway-type";
/// Header carrying the channel.
pub const CHANNEL: &str = "channel";

/// Static client/channel metadata sent on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientIdentity {
    /// Client build version
    pub client_version: String,
    /// Kind of client (web, pwa, ...)
    pub client_type: String,
    /// Hosting app version
    pub app_version: String,
    /// Gateway flavour the backend should route through
    pub gateway_type: String,
    /// Sales/distribution channel
    pub channel: String,
}

impl Default for ClientIdentity {
    fn default() -> Self {
        Self {
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            client_type: "web".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            gateway_type: "default".to_string(),
            channel: "web".to_string(),
        }
    }
}

/// Builds the header list for one call.
///
/// `Authorization` is left out when there is no token.
pub fn build(
    token: Option<&str>,
    device_id: &DeviceId,
    trace_number: &TraceNumber,
    identity: &ClientIdentity,
) -> Vec<(String, String)> {
    let mut headers = Vec::with_capacity(8);
    if let Some(token) = token {
        headers.push(("Authorization".to_string(), format!("Bearer {token}")));
    }
    headers.extend(
        [
            (DEVICE_ID, device_id.to_string()),
            (TRACE_NUMBER, trace_number.to_string()),
            (CLIENT_VERSION, identity.client_version.clone()),
            (CLIENT_TYPE, identity.client_type.clone()),
            (APP_VERSION, identity.app_version.clone()),
            (GATEWAY_TYPE, identity.gateway_type.clone()),
            (CHANNEL, identity.channel.clone()),
        ]
        .map(|(name, value)| (name.to_string(), value)),
    );
    headers
}
