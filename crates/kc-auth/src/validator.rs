//! Registration username validation.
//!
//! One rules engine backs two registration form actions:
//!
//! - [`ValidatorProfile::UsernameAction`] validates only the username and
//!   tolerates a missing denylist.
//! - [`ValidatorProfile::ProfileForm`] validates the whole registration
//!   profile (names, email, username) and requires a denylist.
//!
//! Checks never short-circuit. Every failing check adds a field-scoped
//! message, and the verdict's canonical reason is the one recorded by the
//! last failing check.

use std::sync::Arc;

use async_trait::async_trait;
use kc_core::event::{details, errors};
use kc_core::AuthenticatorConfig;
use kc_model::{Realm, User};
use kc_storage::UserProvider;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::authenticator::{AuthContext, FormAction};
use crate::error::AuthResult;
use crate::form::{fields, messages, FormMessage};
use crate::hook::HookClient;
use crate::rules::{is_blank, is_email_valid, Denylist, UsernamePattern};

/// Config key holding the username pattern.
pub const USERNAME_REGEX: &str = "profile.username.regex";
/// Config key holding the comma-separated denylist.
pub const INVALID_USERNAMES: &str = "profile.username.invalid";
/// Config key holding the veto hook URL.
pub const HOOK_URL: &str = "profile.username.hook-url";

/// Why a registration was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// A required field was empty.
    MissingField,
    /// The username is on the denylist.
    UsernameReserved,
    /// The username does not match the pattern.
    InvalidCharacters,
    /// The external hook vetoed the username.
    ExternalVeto,
    /// The email already belongs to another account.
    EmailInUse,
    /// The email is malformed.
    InvalidEmail,
}

impl RejectReason {
    /// Returns the audit event error code for this reason.
    #[must_use]
    pub const fn event_error(self) -> &'static str {
        match self {
            Self::MissingField | Self::InvalidEmail => errors::INVALID_REGISTRATION,
            Self::UsernameReserved | Self::InvalidCharacters | Self::ExternalVeto => {
                errors::INVALID_USER_CREDENTIALS
            }
            Self::EmailInUse => errors::EMAIL_IN_USE,
        }
    }
}

/// Outcome of a validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Every check passed.
    Accepted,
    /// At least one check failed.
    Rejected {
        /// Reason recorded by the last failing check.
        reason: RejectReason,
        /// Every failure, in check order.
        errors: Vec<FormMessage>,
    },
}

impl Verdict {
    /// Checks if the candidate was accepted.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Returns the canonical rejection reason.
    #[must_use]
    pub const fn reason(&self) -> Option<RejectReason> {
        match self {
            Self::Accepted => None,
            Self::Rejected { reason, .. } => Some(*reason),
        }
    }

    /// Returns the field the canonical reason is attached to.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.errors().last().map(|m| m.field.as_str())
    }

    /// Returns every field-scoped message.
    #[must_use]
    pub fn errors(&self) -> &[FormMessage] {
        match self {
            Self::Accepted => &[],
            Self::Rejected { errors, .. } => errors,
        }
    }

    /// Checks if any message is attached to `field`.
    #[must_use]
    pub fn has_error_on(&self, field: &str) -> bool {
        self.errors().iter().any(|m| m.field == field)
    }
}

/// Collects failures while checks run.
#[derive(Debug, Default)]
struct Rejections {
    reason: Option<RejectReason>,
    errors: Vec<FormMessage>,
}

impl Rejections {
    fn reject(&mut self, reason: RejectReason, field: &str, message: &str) {
        self.reason = Some(reason);
        self.errors.push(FormMessage::new(field, message));
    }

    fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    fn into_verdict(self) -> Verdict {
        match self.reason {
            Some(reason) => Verdict::Rejected {
                reason,
                errors: self.errors,
            },
            None => Verdict::Accepted,
        }
    }
}

/// Values submitted on the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    /// Requested username.
    pub username: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
}

impl Candidate {
    /// Creates a candidate with only a username.
    #[must_use]
    pub fn username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    /// Reads the candidate from submitted form values.
    #[must_use]
    pub fn from_context(context: &AuthContext) -> Self {
        let value = |key: &str| context.form_value(key).map(str::to_owned);
        Self {
            username: value(fields::USERNAME),
            email: value(fields::EMAIL),
            first_name: value(fields::FIRST_NAME),
            last_name: value(fields::LAST_NAME),
        }
    }

    /// Sets the email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets first and last name.
    #[must_use]
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }
}

/// Which form action the rules engine backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorProfile {
    /// Username-only validation; the denylist is optional.
    UsernameAction,
    /// Full registration profile validation; the denylist is required.
    ProfileForm,
}

impl ValidatorProfile {
    /// Returns the provider ID the host registers this profile under.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::UsernameAction => "registration-username-action",
            Self::ProfileForm => "registration-invalid-username-profile-action",
        }
    }

    /// Returns the display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::UsernameAction => "Username Validation in Registration Form",
            Self::ProfileForm => "Profile Validation with Invalid Usernames",
        }
    }

    const fn requires_denylist(self) -> bool {
        matches!(self, Self::ProfileForm)
    }

    const fn checks_profile(self) -> bool {
        matches!(self, Self::ProfileForm)
    }
}

/// Username rules compiled from an execution's configuration.
#[derive(Debug, Clone)]
pub struct UsernamePolicy {
    pattern: UsernamePattern,
    denylist: Denylist,
    hook_url: Option<String>,
}

impl UsernamePolicy {
    /// Compiles the policy for `profile`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the pattern is missing or does
    /// not compile, or if the profile requires a denylist and none is set.
    pub fn from_config(profile: ValidatorProfile, config: &AuthenticatorConfig) -> AuthResult<Self> {
        let pattern = UsernamePattern::new(config.require(USERNAME_REGEX)?)?;

        let denylist = if profile.requires_denylist() {
            Denylist::parse(config.require(INVALID_USERNAMES)?)
        } else {
            config
                .get(INVALID_USERNAMES)
                .map(Denylist::parse)
                .unwrap_or_default()
        };

        Ok(Self {
            pattern,
            denylist,
            hook_url: config.get_non_empty(HOOK_URL).map(str::to_owned),
        })
    }

    /// Returns the compiled pattern.
    #[must_use]
    pub const fn pattern(&self) -> &UsernamePattern {
        &self.pattern
    }

    /// Returns the denylist.
    #[must_use]
    pub const fn denylist(&self) -> &Denylist {
        &self.denylist
    }

    /// Returns the hook URL, if one is configured.
    #[must_use]
    pub fn hook_url(&self) -> Option<&str> {
        self.hook_url.as_deref()
    }
}

/// Registration form action validating usernames.
pub struct RegistrationValidator {
    profile: ValidatorProfile,
    policy: UsernamePolicy,
    users: Arc<dyn UserProvider>,
    hook: HookClient,
}

impl RegistrationValidator {
    /// Creates a validator for one flow execution.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the configuration is unusable;
    /// see [`UsernamePolicy::from_config`].
    pub fn new(
        profile: ValidatorProfile,
        config: &AuthenticatorConfig,
        users: Arc<dyn UserProvider>,
        hook: HookClient,
    ) -> AuthResult<Self> {
        Ok(Self {
            profile,
            policy: UsernamePolicy::from_config(profile, config)?,
            users,
            hook,
        })
    }

    /// Returns the profile this validator runs.
    #[must_use]
    pub const fn profile(&self) -> ValidatorProfile {
        self.profile
    }

    /// Returns the compiled policy.
    #[must_use]
    pub const fn policy(&self) -> &UsernamePolicy {
        &self.policy
    }

    /// Runs every applicable check against `candidate`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the email-in-use lookup fails.
    pub async fn evaluate(&self, realm: &Realm, candidate: &Candidate) -> AuthResult<Verdict> {
        let mut rejections = Rejections::default();

        if self.profile.checks_profile() {
            self.check_profile(realm, candidate, &mut rejections).await?;
        }

        match candidate.username.as_deref() {
            Some(username) if !is_blank(Some(username)) => {
                self.check_username(username, &mut rejections);
                if rejections.is_empty() {
                    self.check_hook(username, &mut rejections).await;
                }
            }
            _ => rejections.reject(
                RejectReason::MissingField,
                fields::USERNAME,
                messages::MISSING_USERNAME,
            ),
        }

        Ok(rejections.into_verdict())
    }

    async fn check_profile(
        &self,
        realm: &Realm,
        candidate: &Candidate,
        rejections: &mut Rejections,
    ) -> AuthResult<()> {
        if is_blank(candidate.first_name.as_deref()) {
            rejections.reject(
                RejectReason::MissingField,
                fields::FIRST_NAME,
                messages::MISSING_FIRST_NAME,
            );
        }

        if is_blank(candidate.last_name.as_deref()) {
            rejections.reject(
                RejectReason::MissingField,
                fields::LAST_NAME,
                messages::MISSING_LAST_NAME,
            );
        }

        let email = match candidate.email.as_deref() {
            Some(email) if !is_blank(Some(email)) => email,
            _ => {
                rejections.reject(
                    RejectReason::MissingField,
                    fields::EMAIL,
                    messages::MISSING_EMAIL,
                );
                return Ok(());
            }
        };

        if !is_email_valid(email) {
            rejections.reject(
                RejectReason::InvalidEmail,
                fields::EMAIL,
                messages::INVALID_EMAIL,
            );
        } else if !realm.is_duplicate_emails_allowed()
            && self.users.email_exists(realm.id, email).await?
        {
            rejections.reject(
                RejectReason::EmailInUse,
                fields::EMAIL,
                messages::EMAIL_EXISTS,
            );
        }

        Ok(())
    }

    fn check_username(&self, username: &str, rejections: &mut Rejections) {
        if self.policy.denylist.contains(username) {
            rejections.reject(
                RejectReason::UsernameReserved,
                fields::USERNAME,
                messages::USERNAME_NOT_AVAILABLE,
            );
        }

        if !self.policy.pattern.matches(username) {
            rejections.reject(
                RejectReason::InvalidCharacters,
                fields::USERNAME,
                messages::INVALID_USERNAME_CHARACTERS,
            );
        }
    }

    async fn check_hook(&self, username: &str, rejections: &mut Rejections) {
        let Some(hook_url) = self.policy.hook_url() else {
            return;
        };

        if self.hook.query(hook_url, username).await.is_veto() {
            rejections.reject(
                RejectReason::ExternalVeto,
                fields::USERNAME,
                messages::REGISTRATION_PREVENTED_EXTERNAL,
            );
        }
    }
}

#[async_trait]
impl FormAction for RegistrationValidator {
    fn id(&self) -> &'static str {
        self.profile.id()
    }

    fn display_name(&self) -> &'static str {
        self.profile.display_name()
    }

    async fn validate(&self, context: &mut AuthContext) -> AuthResult<Verdict> {
        let candidate = Candidate::from_context(context);
        context.event_mut().add_detail(details::REGISTER_METHOD, "form");

        let verdict = self.evaluate(&context.realm, &candidate).await?;

        if let Verdict::Rejected { reason, errors: reported } = &verdict {
            let rejected = |field: &str, missing: &str| {
                reported.iter().any(|m| m.field == field && m.message != missing)
            };
            let event = context.event_mut();
            if let Some(email) = candidate.email.as_deref() {
                if rejected(fields::EMAIL, messages::MISSING_EMAIL) {
                    event.add_detail(details::EMAIL, email);
                }
            }
            if let Some(username) = candidate.username.as_deref() {
                if rejected(fields::USERNAME, messages::MISSING_USERNAME) {
                    event.add_detail(details::USERNAME, username);
                }
            }
            event.set_error(reason.event_error());
            debug!(
                validator = self.profile.id(),
                reason = ?reason,
                errors = verdict.errors().len(),
                "Registration rejected"
            );
        }

        Ok(verdict)
    }

    fn success(&self, context: &AuthContext, user: &mut User) {
        if !self.profile.checks_profile() {
            return;
        }

        let candidate = Candidate::from_context(context);
        user.first_name = candidate.first_name;
        user.last_name = candidate.last_name;
        user.email = candidate.email;
        if let Some(username) = candidate.username {
            user.username = username;
        }
        user.touch();
    }
}
