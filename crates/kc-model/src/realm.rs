//! Realm domain model.
//!
//! A realm is the top-level container for users. Only the settings that
//! influence registration and credential reset are modelled here.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A Keycloak realm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Realm {
    /// Unique identifier.
    pub id: Uuid,
    /// Unique realm name.
    pub name: String,

    // === Registration Settings ===
    /// Allow user self-registration.
    pub registration_allowed: bool,
    /// Allow password reset.
    pub reset_password_allowed: bool,

    // === Login Settings ===
    /// Allow login with email address.
    pub login_with_email_allowed: bool,
    /// Allow duplicate email addresses.
    pub duplicate_emails_allowed: bool,
}

impl Realm {
    /// Creates a realm with default login settings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            registration_allowed: false,
            reset_password_allowed: false,
            login_with_email_allowed: true,
            duplicate_emails_allowed: false,
        }
    }

    /// Sets whether users may identify themselves by email.
    #[must_use]
    pub const fn with_login_with_email(mut self, allowed: bool) -> Self {
        self.login_with_email_allowed = allowed;
        self
    }

    /// Sets whether several users may share an email address.
    #[must_use]
    pub const fn with_duplicate_emails(mut self, allowed: bool) -> Self {
        self.duplicate_emails_allowed = allowed;
        self
    }

    /// Returns whether users may identify themselves by email.
    #[must_use]
    pub const fn is_login_with_email_allowed(&self) -> bool {
        self.login_with_email_allowed
    }

    /// Returns whether several users may share an email address.
    #[must_use]
    pub const fn is_duplicate_emails_allowed(&self) -> bool {
        self.duplicate_emails_allowed
    }
}
