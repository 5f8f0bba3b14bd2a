//! Local username rules.
//!
//! Each rule is a pure function of the candidate value and compiled
//! configuration. Rules never consult the identity store or the network.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AuthError, AuthResult};

static EMAIL_FORMAT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

/// Returns whether a submitted value is absent, empty or whitespace only.
#[must_use]
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Basic email format check.
#[must_use]
pub fn is_email_valid(email: &str) -> bool {
    EMAIL_FORMAT
        .as_ref()
        .is_some_and(|regex| regex.is_match(email.trim()))
}

/// Reserved usernames, compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Denylist {
    entries: HashSet<String>,
}

impl Denylist {
    /// Parses a comma-separated list.
    ///
    /// Entries are trimmed and lowercased; empty entries are ignored.
    #[must_use]
    pub fn parse(list: &str) -> Self {
        let entries = list
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_lowercase)
            .collect();
        Self { entries }
    }

    /// Returns whether `username` is reserved.
    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.entries.contains(&username.to_lowercase())
    }

    /// Returns the number of reserved names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether nothing is reserved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Username pattern with whole-string match semantics.
#[derive(Debug, Clone)]
pub struct UsernamePattern {
    source: String,
    regex: Regex,
}

impl UsernamePattern {
    /// Compiles a pattern.
    ///
    /// The pattern must match the entire username, so it is anchored on
    /// both ends regardless of how the operator wrote it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the pattern does not compile.
    pub fn new(pattern: &str) -> AuthResult<Self> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            AuthError::Configuration(format!("invalid username pattern '{pattern}': {e}"))
        })?;
        Ok(Self {
            source: pattern.to_owned(),
            regex,
        })
    }

    /// Returns whether the whole username matches.
    #[must_use]
    pub fn matches(&self, username: &str) -> bool {
        self.regex.is_match(username)
    }

    /// Returns the pattern as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}
