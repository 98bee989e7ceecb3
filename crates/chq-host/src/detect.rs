//! Choosing a bridge once at startup.
//!
//! Two independent strategies look at the environment:
//!
//! 1. **Capability probe**: the Android interface or the WebKit message
//!    handler has been injected under its configured name.
//! 2. **User agent**: the shell announced itself (`; wv)` for Android
//!    WebView, the configured host token for either platform).
//!
//! The probe wins when both answer. A user-agent hit without the injected
//! object still selects the platform, since some shells inject late.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::bridge::{
    AndroidBridge, HostBridge, HostChannel, HostPlatform, NoopBridge, WebKitBridge,
};

/// What the embedding runtime exposes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEnvironment {
    /// Browser user agent
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Names of injected JavaScript interfaces
    #[serde(default)]
    pub injected_interfaces: Vec<String>,
    /// Names of registered script message handlers
    #[serde(default)]
    pub message_handlers: Vec<String>,
}

/// Names the native shells use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Android injected interface name
    pub android_interface: String,
    /// WebKit message handler name
    pub webkit_handler: String,
    /// Token the shells append to the user agent
    pub user_agent_token: String,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            android_interface: "ChequeHost".to_string(),
            webkit_handler: "chequeHost".to_string(),
            user_agent_token: "ChequeflowHost".to_string(),
        }
    }
}

fn probe(env: &HostEnvironment, config: &DetectionConfig) -> HostPlatform {
    if env
        .injected_interfaces
        .iter()
        .any(|i| *i == config.android_interface)
    {
        HostPlatform::Android
    } else if env
        .message_handlers
        .iter()
        .any(|h| *h == config.webkit_handler)
    {
        HostPlatform::WebKit
    } else {
        HostPlatform::None
    }
}

fn sniff(env: &HostEnvironment, config: &DetectionConfig) -> HostPlatform {
    let Some(agent) = env.user_agent.as_deref() else {
        return HostPlatform::None;
    };
    let is_android = agent.contains("Android");
    let is_ios = agent.contains("iPhone") || agent.contains("iPad");
    let announced = agent.contains(&config.user_agent_token);

    if is_android && (announced || agent.contains("; wv)")) {
        HostPlatform::Android
    } else if is_ios && announced {
        HostPlatform::WebKit
    } else {
        HostPlatform::None
    }
}

/// Platform the environment points at.
pub fn detect_platform(env: &HostEnvironment, config: &DetectionConfig) -> HostPlatform {
    match probe(env, config) {
        HostPlatform::None => sniff(env, config),
        found => found,
    }
}

/// Builds the bridge for the environment.
pub fn detect(
    env: &HostEnvironment,
    config: &DetectionConfig,
    channel: Arc<dyn HostChannel>,
) -> Box<dyn HostBridge> {
    let platform = detect_platform(env, config);
    tracing::info!(platform = ?platform, "Host detected");
    match platform {
        HostPlatform::Android => Box::new(AndroidBridge::new(&config.android_interface, channel)),
        HostPlatform::WebKit => Box::new(WebKitBridge::new(&config.webkit_handler, channel)),
        HostPlatform::None => Box::new(NoopBridge),
    }
}
