//! In-app routes and browser-style history.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An in-app location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    /// Path, always starting with `/`
    pub path: String,
    /// Query-style parameters
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl Route {
    /// Creates a route, adding the leading `/` if missing.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        Self {
            path,
            params: BTreeMap::new(),
        }
    }

    /// Adds a parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)?;
        for (i, (key, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}

impl From<&str> for Route {
    fn from(path: &str) -> Self {
        Route::new(path)
    }
}

/// Linear history with a cursor, like a browser tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteHistory {
    entries: Vec<Route>,
    cursor: usize,
}

impl RouteHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current entry.
    pub fn current(&self) -> Option<&Route> {
        self.entries.get(self.cursor)
    }

    /// Number of entries, including forward ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was ever pushed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether [`back`](Self::back) would move.
    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    /// Whether [`forward`](Self::forward) would move.
    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Appends `route` after the current entry, dropping forward entries.
    pub fn push(&mut self, route: Route) {
        if self.entries.is_empty() {
            self.entries.push(route);
            self.cursor = 0;
            return;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(route);
        self.cursor = self.entries.len() - 1;
    }

    /// Moves one entry back.
    pub fn back(&mut self) -> Option<&Route> {
        if !self.can_go_back() {
            return None;
        }
        self.cursor -= 1;
        self.current()
    }

    /// Moves one entry forward.
    pub fn forward(&mut self) -> Option<&Route> {
        if !self.can_go_forward() {
            return None;
        }
        self.cursor += 1;
        self.current()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}
