//! Configuration for the `chq` command.
//!
//! A config file is optional. Values are layered as defaults, then the
//! TOML file, then `CHQ_SECTION__KEY` environment variables.

use std::path::{Path, PathBuf};

use chq_client::{ClientIdentity, GatewayConfig};
use chq_core::ScreenId;
use chq_host::{
    DetectionConfig, HostAction, HostEnvironment, Route, RouteTrigger, RouteTriggerTable,
};
use chq_workflow::ScreenRouter;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "CHQ";

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CHQ_CONFIG";

/// Separator between path segments in an override name.
const ENV_SEPARATOR: &str = "__";

// ============================================================================
// ConfigManager
// ============================================================================

/// Loading, layering and exporting of a TOML-backed configuration.
pub trait ConfigManager: Sized + Default + Serialize + DeserializeOwned {
    /// Name used in messages and the config directory.
    fn project_name() -> &'static str;

    /// Prefix of environment overrides.
    fn env_prefix() -> &'static str;

    /// Variable that may name the config file.
    fn config_env_var() -> &'static str;

    /// Where the config lives when nothing else is said.
    fn default_config_path() -> Option<PathBuf>;

    /// Explicit path, then the config variable, then the default.
    fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var(Self::config_env_var())
            && !path.is_empty()
        {
            return Some(PathBuf::from(path));
        }
        Self::default_config_path()
    }

    /// Reads the config file if there is one and applies environment overrides.
    fn load(explicit: Option<&str>) -> Result<Self> {
        let base = match Self::resolve_config_path(explicit) {
            Some(path) if path.exists() => {
                let content =
                    std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
                tracing::debug!(path = %path.display(), "Loading config file");
                toml::from_str(&content)
                    .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?
            }
            _ => Self::default(),
        };
        base.apply_env(std::env::vars())
    }

    /// Applies `PREFIX_SECTION__KEY=value` overrides.
    ///
    /// Variables without the separator are ignored, so `CHQ_CONFIG` and
    /// token variables never collide with settings.
    fn apply_env<I>(self, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let prefix = format!("{}_", Self::env_prefix());
        let overrides: Vec<(String, String)> = vars
            .into_iter()
            .filter_map(|(name, raw)| {
                let rest = name.strip_prefix(&prefix)?;
                rest.contains(ENV_SEPARATOR).then(|| {
                    let key = rest.to_lowercase().replace(ENV_SEPARATOR, ".");
                    tracing::debug!(var = %name, key = %key, "Config override from environment");
                    (key, raw)
                })
            })
            .collect();
        if overrides.is_empty() {
            return Ok(self);
        }

        let mut tree = ConfigTree::from_config(&self)?;
        for (key, raw) in &overrides {
            tree.set_from_str(key, raw)?;
        }
        tree.into_config()
            .map_err(|e| Error::config(format!("Invalid environment override: {e}")))
    }

    /// Pretty TOML rendering.
    fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flattens the config into `PREFIX_SECTION__KEY` pairs, sorted by name.
    fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        Ok(ConfigTree::from_config(self)?.env_pairs(Self::env_prefix()))
    }
}

// ============================================================================
// ConfigTree
// ============================================================================

/// A configuration as an untyped TOML tree, addressed by dotted keys
/// such as `gateway.base_url`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigTree(toml::Value);

impl ConfigTree {
    /// Tree of a typed configuration.
    pub fn from_config<C: Serialize>(config: &C) -> Result<Self> {
        toml::Value::try_from(config)
            .map(Self)
            .map_err(|e| Error::config(e.to_string()))
    }

    /// Parses a config file without checking it against any type.
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        toml::from_str(&content)
            .map(Self)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Writes the tree as pretty TOML.
    pub fn write(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(&self.0).map_err(|e| Error::config(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| Error::io_with_path(e, path))
    }

    /// Deserializes the tree into a typed configuration.
    pub fn into_config<C: DeserializeOwned>(self) -> std::result::Result<C, toml::de::Error> {
        self.0.try_into()
    }

    /// Value at `key`, if every segment resolves.
    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        key.split('.')
            .try_fold(&self.0, |node, segment| node.as_table()?.get(segment))
    }

    /// Puts `value` at `key`. Missing sections are created; walking
    /// through a scalar is an error.
    pub fn set(&mut self, key: &str, value: toml::Value) -> Result<()> {
        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(Error::config(format!("Invalid key '{key}'")));
        }

        let mut node = &mut self.0;
        for segment in parents.into_iter().flat_map(|p| p.split('.')) {
            node = node
                .as_table_mut()
                .ok_or_else(|| Error::config(format!("'{key}' runs through a plain value")))?
                .entry(segment)
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        }
        node.as_table_mut()
            .ok_or_else(|| Error::config(format!("'{key}' runs through a plain value")))?
            .insert(leaf.to_string(), value);
        Ok(())
    }

    /// Puts `raw` at `key`, typed like the value it replaces.
    ///
    /// Strings stay strings, lists are parsed as TOML arrays and anything
    /// else goes through [`scalar`].
    pub fn set_from_str(&mut self, key: &str, raw: &str) -> Result<()> {
        let value = match self.get(key) {
            Some(toml::Value::String(_)) => toml::Value::String(raw.to_string()),
            Some(toml::Value::Array(_)) => toml::from_str::<toml::Table>(&format!("v = {raw}"))
                .ok()
                .and_then(|mut table| table.remove("v"))
                .unwrap_or_else(|| toml::Value::String(raw.to_string())),
            _ => scalar(raw),
        };
        self.set(key, value)
    }

    /// Every leaf as a `PREFIX_SECTION__KEY` pair, sorted by name.
    pub fn env_pairs(&self, prefix: &str) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        collect_leaves(&self.0, &mut vec![prefix.to_string()], &mut pairs);
        pairs.sort();
        pairs
    }
}

fn collect_leaves(node: &toml::Value, path: &mut Vec<String>, out: &mut Vec<(String, String)>) {
    let name = |path: &[String]| match path.split_first() {
        Some((prefix, keys)) => format!("{prefix}_{}", keys.join(ENV_SEPARATOR)),
        None => String::new(),
    };
    match node {
        toml::Value::Table(table) => {
            for (key, child) in table {
                path.push(key.to_uppercase());
                collect_leaves(child, path, out);
                path.pop();
            }
        }
        toml::Value::String(s) => out.push((name(path.as_slice()), s.clone())),
        other => out.push((name(path.as_slice()), other.to_string())),
    }
}

/// Reads a command-line or environment value as a bool, an integer, a
/// float, or failing all of those a string.
pub fn scalar(raw: &str) -> toml::Value {
    match raw {
        "true" => toml::Value::Boolean(true),
        "false" => toml::Value::Boolean(false),
        _ => raw
            .parse::<i64>()
            .map(toml::Value::Integer)
            .or_else(|_| raw.parse::<f64>().map(toml::Value::Float))
            .unwrap_or_else(|_| toml::Value::String(raw.to_string())),
    }
}

/// Human form of a value: strings unquoted, tables as TOML.
pub fn render(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        other => other.to_string(),
    }
}

// ============================================================================
// ChqConfig
// ============================================================================

/// Everything `chq` can be configured with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChqConfig {
    /// Gateway location, timeout and retry
    pub gateway: GatewayConfig,
    /// Client metadata sent as headers
    pub identity: ClientIdentity,
    /// Where the bearer token comes from
    pub auth: AuthConfig,
    /// Device id persistence
    pub device: DeviceConfig,
    /// Host detection and route triggers
    pub host: HostConfig,
    /// Log filter
    pub logging: LoggingConfig,
}

impl ConfigManager for ChqConfig {
    fn project_name() -> &'static str {
        "chq"
    }

    fn env_prefix() -> &'static str {
        ENV_PREFIX
    }

    fn config_env_var() -> &'static str {
        CONFIG_ENV
    }

    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("chequeflow").join("config.toml"))
    }
}

/// Bearer token source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Variable read on every call
    pub token_env: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_env: "CHQ_ACCESS_TOKEN".to_string(),
        }
    }
}

/// Device id persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// File holding the device id; the platform data directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_file: Option<PathBuf>,
}

/// What the embedding runtime looks like, and which routes call out to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// User agent to report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Injected JavaScript interfaces
    pub interfaces: Vec<String>,
    /// Registered script message handlers
    pub message_handlers: Vec<String>,
    /// Names the native shells use
    pub detection: DetectionConfig,
    /// Route-triggered host actions
    pub triggers: Vec<TriggerConfig>,
}

impl HostConfig {
    /// The environment handed to host detection.
    pub fn environment(&self) -> HostEnvironment {
        HostEnvironment {
            user_agent: self.user_agent.clone(),
            injected_interfaces: self.interfaces.clone(),
            message_handlers: self.message_handlers.clone(),
        }
    }

    /// Compiles the configured triggers.
    pub fn trigger_table(&self) -> Result<RouteTriggerTable> {
        let mut table = RouteTriggerTable::new();
        for trigger in &self.triggers {
            table.add(trigger.compile()?);
        }
        Ok(table)
    }
}

/// Host action named in a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Close the web view
    Close,
    /// Open the native app
    Open,
    /// Navigate to a native route
    Navigate,
}

/// One configured route trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Route pattern, e.g. `/cheque/deliveryInfo`
    pub pattern: String,
    /// What to ask the host for
    pub action: TriggerKind,
    /// Native route; required for `navigate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    /// Action parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    /// In-app route used without a host
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

fn default_fallback() -> String {
    ScreenRouter::route(ScreenId::Start).path
}

impl TriggerConfig {
    /// Builds the runtime trigger.
    pub fn compile(&self) -> Result<RouteTrigger> {
        let action = match (self.action, &self.route) {
            (TriggerKind::Close, _) => HostAction::Close,
            (TriggerKind::Open, _) => HostAction::OpenNativeApp,
            (TriggerKind::Navigate, Some(route)) => HostAction::NavigateToNative {
                route: route.clone(),
            },
            (TriggerKind::Navigate, None) => {
                return Err(Error::config(format!(
                    "trigger '{}' navigates but names no route",
                    self.pattern
                )));
            }
        };
        let trigger = RouteTrigger::new(&self.pattern, action, Route::new(self.fallback.as_str()))?;
        Ok(match &self.params {
            Some(params) => trigger.with_params(params.clone()),
            None => trigger,
        })
    }
}

/// Log filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}
