//! "Choose user" step of the credential reset flow.
//!
//! Resolves which account a "forgot password" request is for. Users that
//! a trusted mechanism already identified (first broker login, action
//! token) skip the form entirely. Otherwise the submitted identifier is
//! looked up by username, then by email; unknown identifiers may be vetoed
//! by an external hook, and the disclosure policy decides whether unknown
//! or disabled accounts produce a distinguishable message.

use std::sync::Arc;

use async_trait::async_trait;
use kc_core::event::{details, errors};
use kc_core::AuthenticatorConfig;
use kc_model::{Realm, User};
use kc_storage::{StorageError, UserProvider};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::authenticator::{AuthContext, Authenticator, AuthenticatorResult};
use crate::error::{AuthError, AuthResult};
use crate::flow::{states, ChooseUserFlow, LookupOutcome, ResolvedIdentity};
use crate::form::{fields, messages, pages};
use crate::hook::HookClient;

/// Provider ID the host registers this authenticator under.
pub const PROVIDER_ID: &str = "reset-credentials-choose-user-hook";
/// Config key enabling distinguishable "invalid user" / "disabled" prompts.
pub const ENABLE_INVALID_PROMPT: &str = "resetcred.choose.prompt";
/// Config key holding the veto hook URL.
pub const HOOK_URL: &str = "resetcred.choose.hook-url";

/// Authentication-session note keys.
pub mod notes {
    /// Set by the first-broker-login flow when the brokered identity
    /// matches an existing account. JSON encoded [`super::ExistingUserInfo`].
    pub const EXISTING_USER_INFO: &str = "EXISTING_USER_INFO";
    /// Set once an action token has been validated. Holds the user ID.
    pub const ACTION_TOKEN_USER_ID: &str = "ACTION_TOKEN_USER_ID";
    /// Identifier the user typed, kept for later steps and auditing.
    pub const ATTEMPTED_USERNAME: &str = "ATTEMPTED_USERNAME";
}

/// Existing account matched during first broker login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingUserInfo {
    /// ID of the matched account.
    pub existing_user_id: Uuid,
    /// Attribute the match was made on.
    #[serde(default)]
    pub duplicate_attribute_name: Option<String>,
    /// Value of that attribute.
    #[serde(default)]
    pub duplicate_attribute_value: Option<String>,
}

/// Settings read from the execution's configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Show "invalid user" / "account disabled" instead of a silent
    /// re-prompt. Off by default; enabling it allows account enumeration.
    pub reveal_invalid_user_prompt: bool,
    /// Veto hook consulted for unknown identifiers.
    pub hook_url: Option<String>,
}

impl ResolverSettings {
    /// Reads the settings. Absent keys fall back to the non-disclosing,
    /// hook-less defaults.
    #[must_use]
    pub fn from_config(config: &AuthenticatorConfig) -> Self {
        Self {
            reveal_invalid_user_prompt: config.get_bool(ENABLE_INVALID_PROMPT, false),
            hook_url: config.get_non_empty(HOOK_URL).map(str::to_owned),
        }
    }
}

/// Outcome of a resolution run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Which user the request resolved to.
    pub identity: ResolvedIdentity,
    /// What the host flow engine should do next.
    pub result: AuthenticatorResult,
}

impl Resolution {
    fn success(flow: ChooseUserFlow<states::Success>) -> Self {
        Self {
            identity: flow.into_identity(),
            result: AuthenticatorResult::success(),
        }
    }
}

/// Reset-credential "choose user" authenticator with hook support.
pub struct ResetCredentialChooseUser {
    settings: ResolverSettings,
    users: Arc<dyn UserProvider>,
    hook: HookClient,
}

impl ResetCredentialChooseUser {
    /// Creates the authenticator for one flow execution.
    #[must_use]
    pub fn new(config: &AuthenticatorConfig, users: Arc<dyn UserProvider>, hook: HookClient) -> Self {
        Self::with_settings(ResolverSettings::from_config(config), users, hook)
    }

    /// Creates the authenticator from already parsed settings.
    #[must_use]
    pub fn with_settings(
        settings: ResolverSettings,
        users: Arc<dyn UserProvider>,
        hook: HookClient,
    ) -> Self {
        Self {
            settings,
            users,
            hook,
        }
    }

    /// Returns the settings in use.
    #[must_use]
    pub const fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Resolves the user for a submitted "forgot password" form.
    ///
    /// On success the user is bound to `context`; otherwise any bound user
    /// is cleared.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::FlowError` for a malformed short-circuit note and
    /// `AuthError::Storage` if the identity store fails or a short-circuit
    /// note names a user that no longer exists.
    pub async fn resolve(&self, context: &mut AuthContext) -> AuthResult<Resolution> {
        let flow = ChooseUserFlow::new();

        if let Some(user) = self.short_circuit_user(context).await? {
            context.set_user(user.clone());
            return Ok(Resolution::success(flow.short_circuit(user)));
        }

        let submitted = context
            .form_value(fields::USERNAME)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        let Some(submitted) = submitted else {
            context.event_mut().set_error(errors::USERNAME_MISSING);
            return Ok(Resolution {
                identity: ResolvedIdentity::None,
                result: AuthenticatorResult::failure_challenge(
                    pages::RESET_PASSWORD,
                    messages::MISSING_USERNAME,
                ),
            });
        };

        let flow = flow.begin_lookup(&submitted);
        let user = self.lookup(&context.realm, flow.identifier()).await?;
        context.set_note(notes::ATTEMPTED_USERNAME, flow.identifier());

        let challenged = match flow.resolved(user) {
            LookupOutcome::Found(success) => {
                if let Some(user) = success.user() {
                    context.set_user(user.clone());
                }
                return Ok(Resolution::success(success));
            }
            LookupOutcome::NotFound(check) => {
                let identifier = check.attempted_username().unwrap_or_default().to_owned();
                let event = context
                    .event()
                    .clone()
                    .detail(details::USERNAME, &identifier)
                    .failure(errors::USER_NOT_FOUND)
                    .build();
                context.send_event(event);
                context.clear_user();

                if self.vetoed(&identifier).await {
                    check.vetoed()
                } else {
                    check
                        .cleared()
                        .apply(self.settings.reveal_invalid_user_prompt)
                }
            }
            LookupOutcome::Disabled(policy) => {
                let mut event = context.event().clone();
                event.add_detail(details::USERNAME, policy.attempted_username().unwrap_or_default());
                if let Some(user) = policy.identity().user() {
                    event = event.user(user.id);
                }
                context.send_event(event.failure(errors::USER_DISABLED).build());
                context.clear_user();

                policy.apply(self.settings.reveal_invalid_user_prompt)
            }
        };

        let result =
            AuthenticatorResult::challenge_with_error(pages::RESET_PASSWORD, challenged.message());
        Ok(Resolution {
            identity: challenged.into_identity(),
            result,
        })
    }

    async fn short_circuit_user(&self, context: &AuthContext) -> AuthResult<Option<User>> {
        let realm_id = context.realm.id;

        if let Some(raw) = context.note(notes::EXISTING_USER_INFO) {
            let info: ExistingUserInfo = serde_json::from_str(raw).map_err(|e| {
                AuthError::FlowError(format!("malformed {} note: {e}", notes::EXISTING_USER_INFO))
            })?;
            let user = self.user_by_id(realm_id, info.existing_user_id).await?;
            debug!(
                username = %user.username,
                "Reset credentials after first broker login; skipping choose-user screen"
            );
            return Ok(Some(user));
        }

        if let Some(raw) = context.note(notes::ACTION_TOKEN_USER_ID) {
            let id = Uuid::parse_str(raw).map_err(|e| {
                AuthError::FlowError(format!("malformed {} note: {e}", notes::ACTION_TOKEN_USER_ID))
            })?;
            // Action token validation already checked that the user exists and is enabled.
            let user = self.user_by_id(realm_id, id).await?;
            debug!(
                username = %user.username,
                "Reset credentials after action token; skipping choose-user screen"
            );
            return Ok(Some(user));
        }

        Ok(None)
    }

    async fn user_by_id(&self, realm_id: Uuid, id: Uuid) -> AuthResult<User> {
        let user = self
            .users
            .get_by_id(realm_id, id)
            .await?
            .ok_or_else(|| StorageError::not_found_by_name("User", id.to_string()))?;
        Ok(user)
    }

    async fn lookup(&self, realm: &Realm, identifier: &str) -> AuthResult<Option<User>> {
        if let Some(user) = self.users.get_by_username(realm.id, identifier).await? {
            return Ok(Some(user));
        }

        if realm.is_login_with_email_allowed() && identifier.contains('@') {
            return Ok(self.users.get_by_email(realm.id, identifier).await?);
        }

        Ok(None)
    }

    async fn vetoed(&self, identifier: &str) -> bool {
        match self.settings.hook_url.as_deref() {
            Some(hook_url) => self.hook.query(hook_url, identifier).await.is_veto(),
            None => false,
        }
    }
}

#[async_trait]
impl Authenticator for ResetCredentialChooseUser {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn display_name(&self) -> &'static str {
        "Choose User (Relaxed Hook)"
    }

    async fn authenticate(&self, context: &mut AuthContext) -> AuthResult<AuthenticatorResult> {
        match self.short_circuit_user(context).await? {
            Some(user) => {
                context.set_user(user);
                Ok(AuthenticatorResult::success())
            }
            None => Ok(AuthenticatorResult::challenge(pages::RESET_PASSWORD)),
        }
    }

    async fn action(&self, context: &mut AuthContext) -> AuthResult<AuthenticatorResult> {
        Ok(self.resolve(context).await?.result)
    }
}
