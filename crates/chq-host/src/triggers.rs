//! Route-triggered host actions.
//!
//! A trigger says "when the app navigates to a path matching this pattern,
//! ask the host to do X; if there is no host, go to this route instead".
//! Patterns are slash-separated segments:
//!
//! - `cheques` matches the literal segment
//! - `:id` captures one segment under the name `id`
//! - a final `*` matches the rest of the path, including nothing

use std::collections::BTreeMap;

use regex::Regex;
use serde_json::Value;

use crate::bridge::HostMessage;
use crate::error::{Error, Result};
use crate::navigator::Route;

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    regex: Regex,
    names: Vec<String>,
}

impl RoutePattern {
    /// Compiles `pattern`.
    pub fn parse(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim_matches('/');
        let segments: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };

        let mut expr = String::from("^");
        let mut names = Vec::new();
        for (i, segment) in segments.iter().enumerate() {
            let last = i + 1 == segments.len();
            if *segment == "*" {
                if !last {
                    return Err(Error::invalid_pattern(pattern, "'*' is only allowed at the end"));
                }
                expr.push_str("(?:/.*)?");
            } else if let Some(name) = segment.strip_prefix(':') {
                if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(Error::invalid_pattern(pattern, format!("bad parameter name '{segment}'")));
                }
                if names.iter().any(|n| n == name) {
                    return Err(Error::invalid_pattern(pattern, format!("duplicate parameter '{name}'")));
                }
                expr.push_str(&format!("/(?P<{name}>[^/]+)"));
                names.push(name.to_string());
            } else {
                expr.push('/');
                expr.push_str(&regex::escape(segment));
            }
        }
        if segments.is_empty() {
            expr.push('/');
        }
        expr.push_str("/?$");

        let regex = Regex::new(&expr).map_err(|e| Error::invalid_pattern(pattern, e.to_string()))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
            names,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Captured parameters if `path` matches.
    pub fn captures(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let caps = self.regex.captures(path)?;
        Some(
            self.names
                .iter()
                .filter_map(|name| {
                    caps.name(name)
                        .map(|m| (name.clone(), m.as_str().to_string()))
                })
                .collect(),
        )
    }

    /// Whether `path` matches.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// What to ask the host for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostAction {
    /// `closeWebView()`
    Close,
    /// `openNativeApp(params)`
    OpenNativeApp,
    /// `navigateToNative({route, params})`
    NavigateToNative {
        /// Native route name
        route: String,
    },
}

impl HostAction {
    /// Builds the host message carrying `params`.
    pub fn to_message(&self, params: Value) -> HostMessage {
        match self {
            HostAction::Close => HostMessage::CloseWebView,
            HostAction::OpenNativeApp => HostMessage::OpenNativeApp { params },
            HostAction::NavigateToNative { route } => HostMessage::NavigateToNative {
                route: route.clone(),
                params,
            },
        }
    }
}

/// One entry of the trigger table.
#[derive(Debug, Clone)]
pub struct RouteTrigger {
    /// Which in-app paths fire the trigger
    pub pattern: RoutePattern,
    /// Host action to invoke
    pub action: HostAction,
    /// Parameters for the host action
    pub params: Value,
    /// In-app route used when there is no host
    pub fallback: Route,
}

impl RouteTrigger {
    /// Creates a trigger.
    pub fn new(pattern: &str, action: HostAction, fallback: Route) -> Result<Self> {
        Ok(Self {
            pattern: RoutePattern::parse(pattern)?,
            action,
            params: Value::Null,
            fallback,
        })
    }

    /// Sets the action parameters.
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    /// Host message for a navigation to `path`, or `None` if it does not match.
    ///
    /// Captured segments are merged into object params without overriding
    /// keys the trigger already sets.
    pub fn message_for(&self, path: &str) -> Option<HostMessage> {
        let captures = self.pattern.captures(path)?;
        let mut params = self.params.clone();
        if let Value::Object(map) = &mut params {
            for (key, value) in captures {
                map.entry(key).or_insert(Value::String(value));
            }
        } else if params.is_null() && !captures.is_empty() {
            params = Value::Object(
                captures
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect(),
            );
        }
        Some(self.action.to_message(params))
    }
}

/// Ordered trigger table.
#[derive(Debug, Clone, Default)]
pub struct RouteTriggerTable {
    triggers: Vec<RouteTrigger>,
}

impl RouteTriggerTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a trigger (builder style).
    pub fn with(mut self, trigger: RouteTrigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    /// Adds a trigger.
    pub fn add(&mut self, trigger: RouteTrigger) {
        self.triggers.push(trigger);
    }

    /// Number of triggers.
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Every trigger matching `path`, in table order, with its message.
    pub fn matching<'a>(
        &'a self,
        path: &'a str,
    ) -> impl Iterator<Item = (&'a RouteTrigger, HostMessage)> + 'a {
        self.triggers
            .iter()
            .filter_map(move |t| t.message_for(path).map(|m| (t, m)))
    }
}
