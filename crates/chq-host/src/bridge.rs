//! Host capability trait and its platform implementations.
//!
//! Both native shells expose the same three messages. They differ only in
//! how a message is addressed:
//!
//! | Platform | Target                          | Payload             |
//! |----------|---------------------------------|---------------------|
//! | Android  | `<interface>.<method>`          | method params       |
//! | WebKit   | `<handler>`                     | `{action, params}`  |
//!
//! The raw post is delegated to a [`HostChannel`], so the bridges stay
//! testable and the embedding runtime decides how a post physically
//! happens.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{Error, Result};

/// Which native shell is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostPlatform {
    /// Android WebView with an injected JavaScript interface
    Android,
    /// iOS WKWebView with a script message handler
    WebKit,
    /// Standalone browser
    None,
}

/// A fire-and-forget message to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum HostMessage {
    /// Close the web view and return to the native app.
    CloseWebView,
    /// Open a native app feature.
    OpenNativeApp {
        /// Feature-specific parameters
        params: Value,
    },
    /// Navigate to a native route.
    NavigateToNative {
        /// Native route name
        route: String,
        /// Route parameters
        params: Value,
    },
}

impl HostMessage {
    /// Host-side method name.
    pub fn method(&self) -> &'static str {
        match self {
            HostMessage::CloseWebView => "closeWebView",
            HostMessage::OpenNativeApp { .. } => "openNativeApp",
            HostMessage::NavigateToNative { .. } => "navigateToNative",
        }
    }

    /// Arguments passed to the host method.
    pub fn params(&self) -> Value {
        match self {
            HostMessage::CloseWebView => Value::Null,
            HostMessage::OpenNativeApp { params } => params.clone(),
            HostMessage::NavigateToNative { route, params } => {
                json!({ "route": route, "params": params })
            }
        }
    }
}

/// Physically posts a payload to a host target.
pub trait HostChannel: Send + Sync {
    /// Posts `payload` to `target`.
    fn post(&self, target: &str, payload: &Value) -> Result<()>;
}

/// Channel that only logs; used by the CLI where no real shell exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogChannel;

impl HostChannel for LogChannel {
    fn post(&self, target: &str, payload: &Value) -> Result<()> {
        tracing::info!(target_name = target, payload = %payload, "Host message posted");
        Ok(())
    }
}

/// Channel that records posts, optionally failing every one.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    posts: Mutex<Vec<(String, Value)>>,
    failing: bool,
}

impl RecordingChannel {
    /// A channel that accepts every post.
    pub fn new() -> Self {
        Self::default()
    }

    /// A channel that records and then rejects every post.
    pub fn failing() -> Self {
        Self {
            posts: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    /// Everything posted so far.
    pub fn posts(&self) -> Vec<(String, Value)> {
        self.posts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl HostChannel for RecordingChannel {
    fn post(&self, target: &str, payload: &Value) -> Result<()> {
        if let Ok(mut posts) = self.posts.lock() {
            posts.push((target.to_string(), payload.clone()));
        }
        if self.failing {
            return Err(Error::delivery(target, "channel rejected the message"));
        }
        Ok(())
    }
}

/// The host capability.
pub trait HostBridge: Send + Sync {
    /// Detected platform.
    fn platform(&self) -> HostPlatform;

    /// Sends a message.
    fn send(&self, message: &HostMessage) -> Result<()>;

    /// Whether a native shell is present.
    fn is_embedded(&self) -> bool {
        self.platform() != HostPlatform::None
    }
}

/// Android injected-interface bridge.
pub struct AndroidBridge {
    interface: String,
    channel: Arc<dyn HostChannel>,
}

impl AndroidBridge {
    /// Bridge calling methods on the JavaScript interface named `interface`.
    pub fn new(interface: impl Into<String>, channel: Arc<dyn HostChannel>) -> Self {
        Self {
            interface: interface.into(),
            channel,
        }
    }
}

impl HostBridge for AndroidBridge {
    fn platform(&self) -> HostPlatform {
        HostPlatform::Android
    }

    fn send(&self, message: &HostMessage) -> Result<()> {
        let target = format!("{}.{}", self.interface, message.method());
        tracing::debug!(target_name = %target, "Posting to Android interface");
        self.channel.post(&target, &message.params())
    }
}

/// WebKit message-handler bridge.
pub struct WebKitBridge {
    handler: String,
    channel: Arc<dyn HostChannel>,
}

impl WebKitBridge {
    /// Bridge posting to the script message handler named `handler`.
    pub fn new(handler: impl Into<String>, channel: Arc<dyn HostChannel>) -> Self {
        Self {
            handler: handler.into(),
            channel,
        }
    }
}

impl HostBridge for WebKitBridge {
    fn platform(&self) -> HostPlatform {
        HostPlatform::WebKit
    }

    fn send(&self, message: &HostMessage) -> Result<()> {
        let envelope = json!({ "action": message.method(), "params": message.params() });
        tracing::debug!(handler = %self.handler, action = message.method(), "Posting to WebKit handler");
        self.channel.post(&self.handler, &envelope)
    }
}

/// Bridge used when no host is present.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBridge;

impl HostBridge for NoopBridge {
    fn platform(&self) -> HostPlatform {
        HostPlatform::None
    }

    fn send(&self, _message: &HostMessage) -> Result<()> {
        Err(Error::NotEmbedded)
    }
}
