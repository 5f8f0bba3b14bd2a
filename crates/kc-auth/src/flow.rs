//! Reset-credential user resolution state machine.
//!
//! Type-safe state machine for the "choose user" step of the credential
//! reset flow. Each state is a distinct type so only legal transitions
//! compile:
//!
//! ```text
//! Start ──short_circuit──────────────────────────────► Success
//!   │
//!   └─begin_lookup─► Lookup ──resolved(enabled user)──► Success
//!                      │
//!                      ├─resolved(none)─► ExternalVetoCheck ─vetoed─► Challenged
//!                      │                        │
//!                      │                      cleared
//!                      │                        ▼
//!                      └─resolved(disabled)──► DisclosurePolicy ─apply─► Challenged
//! ```

use std::marker::PhantomData;

use kc_model::User;

use crate::form::messages;

/// Resolution states.
pub mod states {
    /// Nothing decided yet.
    #[derive(Debug, Clone, Copy)]
    pub struct Start;

    /// Looking up the submitted identifier.
    #[derive(Debug, Clone, Copy)]
    pub struct Lookup;

    /// No user found; the external hook may veto.
    #[derive(Debug, Clone, Copy)]
    pub struct ExternalVetoCheck;

    /// Deciding whether to reveal why no user was resolved.
    #[derive(Debug, Clone, Copy)]
    pub struct DisclosurePolicy;

    /// A user was resolved; the flow advances.
    #[derive(Debug, Clone, Copy)]
    pub struct Success;

    /// The identifier form is shown again.
    #[derive(Debug, Clone, Copy)]
    pub struct Challenged;
}

/// Which user, if any, the step resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedIdentity {
    /// No user matched.
    None,
    /// A user matched the identifier. It may be disabled.
    Found(User),
    /// A trusted upstream mechanism already identified the user.
    ShortCircuited(User),
}

impl ResolvedIdentity {
    /// Returns the resolved user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::None => None,
            Self::Found(user) | Self::ShortCircuited(user) => Some(user),
        }
    }

    /// Returns whether a usable account was resolved.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.user().is_some_and(User::is_enabled)
    }

    /// Returns whether lookup was skipped.
    #[must_use]
    pub const fn is_short_circuited(&self) -> bool {
        matches!(self, Self::ShortCircuited(_))
    }
}

/// Why lookup did not produce a usable user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No user matched the identifier.
    NotFound,
    /// The matched user is disabled.
    Disabled,
}

impl Denial {
    /// Message shown when the disclosure policy reveals the denial.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotFound => messages::INVALID_USER,
            Self::Disabled => messages::ACCOUNT_DISABLED,
        }
    }
}

/// State of the "choose user" step.
///
/// The generic parameter `S` represents the current state.
#[derive(Debug)]
pub struct ChooseUserFlow<S> {
    attempted_username: Option<String>,
    identity: ResolvedIdentity,
    denial: Option<Denial>,
    message: Option<&'static str>,
    _state: PhantomData<S>,
}

impl<S> ChooseUserFlow<S> {
    fn into_state<T>(self) -> ChooseUserFlow<T> {
        ChooseUserFlow {
            attempted_username: self.attempted_username,
            identity: self.identity,
            denial: self.denial,
            message: self.message,
            _state: PhantomData,
        }
    }

    /// Returns the identity resolved so far.
    #[must_use]
    pub const fn identity(&self) -> &ResolvedIdentity {
        &self.identity
    }

    /// Returns the trimmed identifier the user submitted, if lookup ran.
    #[must_use]
    pub fn attempted_username(&self) -> Option<&str> {
        self.attempted_username.as_deref()
    }
}

impl Default for ChooseUserFlow<states::Start> {
    fn default() -> Self {
        Self::new()
    }
}

impl ChooseUserFlow<states::Start> {
    /// Starts resolution.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attempted_username: None,
            identity: ResolvedIdentity::None,
            denial: None,
            message: None,
            _state: PhantomData,
        }
    }

    /// The user was identified upstream; skip every check.
    #[must_use]
    pub fn short_circuit(mut self, user: User) -> ChooseUserFlow<states::Success> {
        self.identity = ResolvedIdentity::ShortCircuited(user);
        self.into_state()
    }

    /// Look up the submitted identifier.
    ///
    /// Surrounding whitespace is removed before lookup.
    #[must_use]
    pub fn begin_lookup(mut self, identifier: &str) -> ChooseUserFlow<states::Lookup> {
        self.attempted_username = Some(identifier.trim().to_owned());
        self.into_state()
    }
}

/// Result of a lookup.
#[derive(Debug)]
pub enum LookupOutcome {
    /// An enabled user matched.
    Found(ChooseUserFlow<states::Success>),
    /// Nothing matched.
    NotFound(ChooseUserFlow<states::ExternalVetoCheck>),
    /// A disabled user matched.
    Disabled(ChooseUserFlow<states::DisclosurePolicy>),
}

impl ChooseUserFlow<states::Lookup> {
    /// Returns the identifier to look up.
    #[must_use]
    pub fn identifier(&self) -> &str {
        self.attempted_username.as_deref().unwrap_or_default()
    }

    /// Records the lookup result.
    #[must_use]
    pub fn resolved(mut self, user: Option<User>) -> LookupOutcome {
        match user {
            None => {
                self.denial = Some(Denial::NotFound);
                LookupOutcome::NotFound(self.into_state())
            }
            Some(user) if !user.is_enabled() => {
                self.identity = ResolvedIdentity::Found(user);
                self.denial = Some(Denial::Disabled);
                LookupOutcome::Disabled(self.into_state())
            }
            Some(user) => {
                self.identity = ResolvedIdentity::Found(user);
                LookupOutcome::Found(self.into_state())
            }
        }
    }
}

impl ChooseUserFlow<states::ExternalVetoCheck> {
    /// The hook vetoed the identifier.
    ///
    /// The veto message is shown regardless of the disclosure policy.
    #[must_use]
    pub fn vetoed(mut self) -> ChooseUserFlow<states::Challenged> {
        self.message = Some(messages::RESET_PASSWORD_PREVENTED_EXTERNAL);
        self.into_state()
    }

    /// No hook, or the hook did not veto.
    #[must_use]
    pub fn cleared(self) -> ChooseUserFlow<states::DisclosurePolicy> {
        self.into_state()
    }
}

impl ChooseUserFlow<states::DisclosurePolicy> {
    /// Returns why no usable user was resolved.
    #[must_use]
    pub fn denial(&self) -> Denial {
        self.denial.unwrap_or(Denial::NotFound)
    }

    /// Applies the disclosure policy.
    ///
    /// With `reveal` the denial's message is shown; otherwise the form is
    /// shown again without any error so account existence is not leaked.
    #[must_use]
    pub fn apply(mut self, reveal: bool) -> ChooseUserFlow<states::Challenged> {
        let denial = self.denial();
        self.message = reveal.then_some(denial.message());
        self.into_state()
    }
}

impl ChooseUserFlow<states::Success> {
    /// Gets the resolved user.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.identity.user()
    }

    /// Converts to the resolved identity.
    #[must_use]
    pub fn into_identity(self) -> ResolvedIdentity {
        self.identity
    }
}

impl ChooseUserFlow<states::Challenged> {
    /// Gets the message to show, if any.
    #[must_use]
    pub const fn message(&self) -> Option<&'static str> {
        self.message
    }

    /// Gets the denial that led here.
    #[must_use]
    pub const fn denial(&self) -> Option<Denial> {
        self.denial
    }

    /// Converts to the resolved identity.
    ///
    /// A disabled account is reported as found, even though the flow does
    /// not continue with it.
    #[must_use]
    pub fn into_identity(self) -> ResolvedIdentity {
        self.identity
    }
}
