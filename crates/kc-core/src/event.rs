//! Audit events for Keycloak Rust.
//!
//! ## NIST 800-53 Rev5: AU-2 (Event Logging)
//!
//! Registration and credential-reset flows record one event per request,
//! plus additional failure events for unknown or disabled accounts.
//!
//! ## NIST 800-53 Rev5: AU-3 (Content of Audit Records)
//!
//! All events include:
//! - Timestamp (ISO 8601)
//! - Event type
//! - User identity (when available)
//! - Outcome and error code (for failures)
//! - Free-form details (username, email, registration method)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// User registered.
    Register,
    /// User registration failed.
    RegisterError,
    /// Password reset requested.
    ResetPassword,
    /// Password reset failed.
    ResetPasswordError,
}

impl EventType {
    /// Returns the matching failure event type.
    #[must_use]
    pub const fn as_error(self) -> Self {
        match self {
            Self::Register | Self::RegisterError => Self::RegisterError,
            Self::ResetPassword | Self::ResetPasswordError => Self::ResetPasswordError,
        }
    }
}

/// Outcome of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOutcome {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Failure,
}

/// Event error codes.
pub mod errors {
    /// Generic registration failure.
    pub const INVALID_REGISTRATION: &str = "invalid_registration";
    /// Username rejected by a rule or hook.
    pub const INVALID_USER_CREDENTIALS: &str = "invalid_user_credentials";
    /// Email already registered.
    pub const EMAIL_IN_USE: &str = "email_in_use";
    /// No username submitted.
    pub const USERNAME_MISSING: &str = "username_missing";
    /// No user matched the submitted identifier.
    pub const USER_NOT_FOUND: &str = "user_not_found";
    /// The matched user is disabled.
    pub const USER_DISABLED: &str = "user_disabled";
}

/// Event detail keys.
pub mod details {
    /// How the user registered (e.g. `form`).
    pub const REGISTER_METHOD: &str = "register_method";
    /// Submitted username.
    pub const USERNAME: &str = "username";
    /// Submitted email.
    pub const EMAIL: &str = "email";
}

/// A security event for audit logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier.
    pub id: Uuid,

    /// Timestamp of the event (ISO 8601).
    pub timestamp: DateTime<Utc>,

    /// Type of event.
    pub event_type: EventType,

    /// Outcome of the event.
    pub outcome: EventOutcome,

    /// Realm ID where the event occurred.
    pub realm_id: Option<Uuid>,

    /// User ID associated with the event.
    pub user_id: Option<Uuid>,

    /// Error code (for failure events).
    pub error: Option<String>,

    /// Additional details as key-value pairs.
    pub details: Vec<(String, String)>,
}

impl Event {
    /// Creates a new event builder.
    #[must_use]
    pub const fn builder(event_type: EventType) -> EventBuilder {
        EventBuilder::new(event_type)
    }

    /// Gets the most recent value recorded for a detail key.
    #[must_use]
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Builder for creating events.
///
/// A flow keeps one builder per request and clones it whenever a
/// side event (e.g. "user not found") has to be sent on its own.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    event_type: EventType,
    outcome: EventOutcome,
    realm_id: Option<Uuid>,
    user_id: Option<Uuid>,
    error: Option<String>,
    details: Vec<(String, String)>,
}

impl EventBuilder {
    /// Creates a new event builder.
    #[must_use]
    pub const fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            outcome: EventOutcome::Success,
            realm_id: None,
            user_id: None,
            error: None,
            details: Vec::new(),
        }
    }

    /// Sets the outcome to failure with an error code.
    ///
    /// The event type is switched to its failure counterpart.
    #[must_use]
    pub fn failure(mut self, error: impl Into<String>) -> Self {
        self.event_type = self.event_type.as_error();
        self.outcome = EventOutcome::Failure;
        self.error = Some(error.into());
        self
    }

    /// Sets the realm ID.
    #[must_use]
    pub const fn realm(mut self, realm_id: Uuid) -> Self {
        self.realm_id = Some(realm_id);
        self
    }

    /// Sets the user ID.
    #[must_use]
    pub const fn user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Adds a detail key-value pair.
    #[must_use]
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_detail(key, value);
        self
    }

    /// Adds a detail key-value pair in place.
    pub fn add_detail(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.details.push((key.into(), value.into()));
    }

    /// Marks the event as failed in place.
    pub fn set_error(&mut self, error: impl Into<String>) {
        self.event_type = self.event_type.as_error();
        self.outcome = EventOutcome::Failure;
        self.error = Some(error.into());
    }

    /// Returns the error code recorded so far.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Builds the event.
    #[must_use]
    pub fn build(self) -> Event {
        Event {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            event_type: self.event_type,
            outcome: self.outcome,
            realm_id: self.realm_id,
            user_id: self.user_id,
            error: self.error,
            details: self.details,
        }
    }
}
