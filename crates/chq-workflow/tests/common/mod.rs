//! Common test utilities and harness for the wizard integration tests.

use std::sync::Arc;

use chq_client::models::ImageFile;
use chq_client::{ClientIdentity, GatewayClient, GatewayConfig, Method, MockTransport, StaticToken};
use chq_core::DeviceId;
use chq_host::{AndroidBridge, HostAdapter, NoopBridge, RecordingChannel, RouteTriggerTable};
use chq_workflow::Wizard;
use serde_json::{Value, json};

/// Request id the scripted gateway mints.
pub const REQUEST_ID: &str = "abc123";

/// Android interface name used by the embedded harness.
pub const INTERFACE: &str = "ChequeHost";

/// Test harness for integration tests.
///
/// Holds the scripted transport and, for embedded runs, the channel that
/// records what was posted to the native shell.
pub struct TestHarness {
    /// Scripted gateway
    pub transport: Arc<MockTransport>,
    /// Messages posted to the host
    pub channel: Arc<RecordingChannel>,
    /// Whether the wizard runs inside a native shell
    pub embedded: bool,
    /// Route triggers installed on the host adapter
    pub triggers: RouteTriggerTable,
}

impl TestHarness {
    /// Creates a harness for a plain browser.
    pub fn new() -> Self {
        Self {
            transport: Arc::new(MockTransport::new()),
            channel: Arc::new(RecordingChannel::new()),
            embedded: false,
            triggers: RouteTriggerTable::new(),
        }
    }

    /// Creates a harness for a wizard embedded in an Android shell.
    pub fn embedded() -> Self {
        Self {
            embedded: true,
            ..Self::new()
        }
    }

    /// Installs route triggers.
    pub fn with_triggers(mut self, triggers: RouteTriggerTable) -> Self {
        self.triggers = triggers;
        self
    }

    /// Builds a wizard over the scripted gateway.
    pub fn wizard(&self) -> Wizard {
        let client = GatewayClient::new(
            GatewayConfig::new("https://bank.test"),
            self.transport.clone(),
            Arc::new(StaticToken::new("test-token")),
            ClientIdentity::default(),
            DeviceId::new(),
        );
        let host = if self.embedded {
            HostAdapter::new(Box::new(AndroidBridge::new(INTERFACE, self.channel.clone())))
        } else {
            HostAdapter::new(Box::new(NoopBridge))
        };
        Wizard::new(client, host.with_triggers(self.triggers.clone()))
    }

    /// Scripts `POST /requests/init` and the step inquiry answering `step`.
    pub fn script_start(&self, step: &str) -> &Self {
        self.transport
            .respond_json(Method::Post, "/requests/init", 200, json!({"request_id": REQUEST_ID}));
        self.script_step(step)
    }

    /// Scripts the step inquiry to answer `step`.
    pub fn script_step(&self, step: &str) -> &Self {
        self.transport.respond_json(
            Method::Get,
            &format!("/requests/{REQUEST_ID}/step-inquiry"),
            200,
            json!({"step": step, "info": []}),
        );
        self
    }

    /// Scripts a JSON answer.
    pub fn ok(&self, method: Method, path: &str, body: Value) -> &Self {
        self.transport.respond_json(method, path, 200, body);
        self
    }

    /// Scripts an error body with `status`.
    pub fn error(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.transport.respond_json(method, path, status, body);
        self
    }

    /// Number of requests sent to `path`.
    pub fn calls(&self, path: &str) -> usize {
        self.transport.call_count(path)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// A small JPEG-looking image.
pub fn image(name: &str) -> ImageFile {
    ImageFile::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0])
}

/// A valid Sayad id.
pub fn sayad_id() -> String {
    "1234567890123456".to_string()
}
