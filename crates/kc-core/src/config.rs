//! Authenticator configuration.
//!
//! Every execution in an authentication flow may carry an operator-supplied
//! configuration: a flat, string-keyed map edited in the admin console.
//! Values are read-only for the lifetime of an evaluation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration attached to a single flow execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatorConfig {
    /// Operator-chosen alias for this configuration.
    #[serde(default)]
    pub alias: Option<String>,
    /// Raw key/value pairs.
    #[serde(default)]
    pub config: HashMap<String, String>,
}

impl AuthenticatorConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Adds a key/value pair.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Gets a raw value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    /// Gets a value, treating an empty string as absent.
    #[must_use]
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Gets a boolean value.
    ///
    /// Only the exact string `"true"` is truthy, matching how the admin
    /// console stores boolean properties. Absent keys yield `default`.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).map_or(default, |v| v == "true")
    }

    /// Gets a value that must be present.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the key is absent.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| Error::missing_key(key))
    }
}
