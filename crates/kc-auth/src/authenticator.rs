//! Authenticator and form action traits.
//!
//! The host flow engine owns HTTP parsing, page rendering and session
//! persistence. It hands each execution an [`AuthContext`] holding the
//! submitted form, the authentication-session notes and the flow's audit
//! event, then applies whatever the execution returns.

use std::collections::HashMap;

use async_trait::async_trait;
use kc_core::event::{Event, EventBuilder, EventType};
use kc_model::{Realm, User};
use uuid::Uuid;

use crate::error::AuthResult;
use crate::validator::Verdict;

/// Result of an authenticator execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticatorResult {
    /// This step succeeded; the flow advances.
    Success,
    /// Render `page` (again), optionally with an error message.
    Challenge {
        /// Page to render.
        page: &'static str,
        /// Message bundle key shown above the form.
        error: Option<String>,
    },
    /// The submission itself was unusable; render `page` with `message`
    /// and count the attempt as failed.
    FailureChallenge {
        /// Page to render.
        page: &'static str,
        /// Message bundle key shown above the form.
        message: String,
    },
}

impl AuthenticatorResult {
    /// Creates a success result.
    #[must_use]
    pub const fn success() -> Self {
        Self::Success
    }

    /// Creates a challenge result without an error message.
    #[must_use]
    pub const fn challenge(page: &'static str) -> Self {
        Self::Challenge { page, error: None }
    }

    /// Creates a challenge result with an optional error message.
    #[must_use]
    pub fn challenge_with_error(page: &'static str, error: Option<&str>) -> Self {
        Self::Challenge {
            page,
            error: error.map(str::to_owned),
        }
    }

    /// Creates a failure challenge result.
    #[must_use]
    pub fn failure_challenge(page: &'static str, message: impl Into<String>) -> Self {
        Self::FailureChallenge {
            page,
            message: message.into(),
        }
    }

    /// Checks if this is a success result.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Checks if this result renders a page.
    #[must_use]
    pub const fn is_challenge(&self) -> bool {
        matches!(self, Self::Challenge { .. } | Self::FailureChallenge { .. })
    }

    /// Returns the message shown with the rendered page, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Challenge { error, .. } => error.as_deref(),
            Self::FailureChallenge { message, .. } => Some(message),
        }
    }
}

/// Authentication context passed to authenticators and form actions.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Realm the flow runs in.
    pub realm: Realm,
    /// Authentication session ID.
    pub session_id: Uuid,
    /// Form data from the request.
    pub form_data: HashMap<String, String>,
    /// Authentication-session notes.
    pub notes: HashMap<String, String>,
    user: Option<User>,
    event: EventBuilder,
    sent_events: Vec<Event>,
}

impl AuthContext {
    /// Creates a new authentication context.
    #[must_use]
    pub fn new(realm: Realm, event_type: EventType) -> Self {
        let event = EventBuilder::new(event_type).realm(realm.id);
        Self {
            realm,
            session_id: Uuid::now_v7(),
            form_data: HashMap::new(),
            notes: HashMap::new(),
            user: None,
            event,
            sent_events: Vec::new(),
        }
    }

    /// Adds a submitted form value.
    #[must_use]
    pub fn with_form_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form_data.insert(key.into(), value.into());
        self
    }

    /// Adds a session note.
    #[must_use]
    pub fn with_note(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.notes.insert(key.into(), value.into());
        self
    }

    /// Gets a form value.
    #[must_use]
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form_data.get(key).map(String::as_str)
    }

    /// Gets a note value.
    #[must_use]
    pub fn note(&self, key: &str) -> Option<&str> {
        self.notes.get(key).map(String::as_str)
    }

    /// Sets a note value.
    pub fn set_note(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.notes.insert(key.into(), value.into());
    }

    /// Returns the user bound to the flow.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Binds a user to the flow.
    pub fn set_user(&mut self, user: User) {
        self.user = Some(user);
    }

    /// Unbinds any user from the flow.
    pub fn clear_user(&mut self) {
        self.user = None;
    }

    /// Returns the flow's audit event.
    #[must_use]
    pub const fn event(&self) -> &EventBuilder {
        &self.event
    }

    /// Returns the flow's audit event for modification.
    pub fn event_mut(&mut self) -> &mut EventBuilder {
        &mut self.event
    }

    /// Records a standalone audit event.
    pub fn send_event(&mut self, event: Event) {
        self.sent_events.push(event);
    }

    /// Returns the standalone events recorded so far.
    #[must_use]
    pub fn sent_events(&self) -> &[Event] {
        &self.sent_events
    }

    /// Finishes the flow's own audit event.
    #[must_use]
    pub fn build_event(&self) -> Event {
        self.event.clone().build()
    }
}

/// Authenticator trait.
///
/// Authenticators are executed during authentication flows and decide
/// which user the flow continues with.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Returns the authenticator ID.
    fn id(&self) -> &'static str;

    /// Returns the display name.
    fn display_name(&self) -> &'static str;

    /// Checks if this authenticator requires a user to be set.
    fn requires_user(&self) -> bool {
        false
    }

    /// Called when the authenticator is first executed.
    async fn authenticate(&self, context: &mut AuthContext) -> AuthResult<AuthenticatorResult>;

    /// Called when the user submits the challenge form.
    async fn action(&self, context: &mut AuthContext) -> AuthResult<AuthenticatorResult> {
        self.authenticate(context).await
    }
}

/// Form action trait.
///
/// Form actions validate one part of a multi-part form (such as the
/// registration page) and contribute to the user created from it.
#[async_trait]
pub trait FormAction: Send + Sync {
    /// Returns the form action ID.
    fn id(&self) -> &'static str;

    /// Returns the display name.
    fn display_name(&self) -> &'static str;

    /// Validates the submitted form.
    async fn validate(&self, context: &mut AuthContext) -> AuthResult<Verdict>;

    /// Called once every form action accepted and the user was created.
    fn success(&self, _context: &AuthContext, _user: &mut User) {}
}
