//! Registration username validation tests.

use kc_auth::form::{fields, messages};
use kc_auth::validator::{HOOK_URL, INVALID_USERNAMES, USERNAME_REGEX};
use kc_auth::{
    AuthContext, FormAction, RegistrationValidator, RejectReason, ValidatorProfile, Verdict,
};
use kc_core::event::{details, errors, EventOutcome, EventType};
use kc_core::AuthenticatorConfig;
use kc_model::User;

use crate::common::TestEnv;

fn config(env: &TestEnv) -> AuthenticatorConfig {
    AuthenticatorConfig::new()
        .with_alias("registration")
        .with(USERNAME_REGEX, "^[a-z0-9_]{3,20}$")
        .with(INVALID_USERNAMES, "admin, root")
        .with(HOOK_URL, env.hook_url())
}

fn validator(
    env: &TestEnv,
    profile: ValidatorProfile,
    config: &AuthenticatorConfig,
) -> anyhow::Result<RegistrationValidator> {
    Ok(RegistrationValidator::new(
        profile,
        config,
        env.users.clone(),
        env.client.clone(),
    )?)
}

fn registration(env: &TestEnv, username: &str) -> AuthContext {
    AuthContext::new(env.realm.clone(), EventType::Register)
        .with_form_value(fields::USERNAME, username)
        .with_form_value(fields::EMAIL, "new@example.com")
        .with_form_value(fields::FIRST_NAME, "New")
        .with_form_value(fields::LAST_NAME, "User")
}

/// A clean username is accepted and the hook is consulted once.
#[tokio::test]
async fn test_valid_username_is_accepted() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.hook_answers(200, "no").await;
    let validator = validator(&env, ValidatorProfile::UsernameAction, &config(&env))?;

    let mut ctx = registration(&env, "alice");
    let verdict = validator.validate(&mut ctx).await?;

    assert!(verdict.is_accepted());
    assert_eq!(env.hook_calls().await, 1);

    let event = ctx.build_event();
    assert_eq!(event.outcome, EventOutcome::Success);
    assert_eq!(event.detail(details::REGISTER_METHOD), Some("form"));
    Ok(())
}

/// Denylisted names are rejected without asking the hook.
#[tokio::test]
async fn test_reserved_username_is_rejected() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.hook_answers(200, "no").await;
    let validator = validator(&env, ValidatorProfile::UsernameAction, &config(&env))?;

    let mut ctx = registration(&env, "root");
    let verdict = validator.validate(&mut ctx).await?;

    assert_eq!(verdict.reason(), Some(RejectReason::UsernameReserved));
    assert_eq!(env.hook_calls().await, 0);

    let event = ctx.build_event();
    assert_eq!(event.event_type, EventType::RegisterError);
    assert_eq!(event.error.as_deref(), Some(errors::INVALID_USER_CREDENTIALS));
    assert_eq!(event.detail(details::USERNAME), Some("root"));
    Ok(())
}

/// Every failure is reported; the last one decides the reason.
#[tokio::test]
async fn test_last_failure_sets_reason() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let validator = validator(&env, ValidatorProfile::UsernameAction, &config(&env))?;

    let mut ctx = registration(&env, "Admin");
    let verdict = validator.validate(&mut ctx).await?;

    assert_eq!(verdict.reason(), Some(RejectReason::InvalidCharacters));
    let reported: Vec<_> = verdict.errors().iter().map(|m| m.message.as_str()).collect();
    assert_eq!(
        reported,
        [messages::USERNAME_NOT_AVAILABLE, messages::INVALID_USERNAME_CHARACTERS]
    );
    assert_eq!(verdict.field(), Some(fields::USERNAME));
    Ok(())
}

/// The hook vetoes names that pass every local rule.
#[tokio::test]
async fn test_hook_veto_rejects() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.hook_answers(200, "yes").await;
    let validator = validator(&env, ValidatorProfile::UsernameAction, &config(&env))?;

    let verdict = validator.validate(&mut registration(&env, "mallory")).await?;

    assert_eq!(
        verdict,
        Verdict::Rejected {
            reason: RejectReason::ExternalVeto,
            errors: vec![kc_auth::FormMessage::new(
                fields::USERNAME,
                messages::REGISTRATION_PREVENTED_EXTERNAL,
            )],
        }
    );
    Ok(())
}

/// A failing hook never blocks registration.
#[tokio::test]
async fn test_hook_failure_fails_open() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.hook_answers(500, "yes").await;
    let validator = validator(&env, ValidatorProfile::UsernameAction, &config(&env))?;

    let verdict = validator.validate(&mut registration(&env, "alice")).await?;

    assert!(verdict.is_accepted());
    assert_eq!(env.hook_calls().await, 1);
    Ok(())
}

/// A blank username is a missing field and skips the username checks.
#[tokio::test]
async fn test_blank_username_is_missing() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.hook_answers(200, "yes").await;
    let validator = validator(&env, ValidatorProfile::UsernameAction, &config(&env))?;

    let mut ctx = registration(&env, "   ");
    let verdict = validator.validate(&mut ctx).await?;

    assert_eq!(verdict.reason(), Some(RejectReason::MissingField));
    assert_eq!(verdict.errors().len(), 1);
    assert_eq!(env.hook_calls().await, 0);

    let event = ctx.build_event();
    assert_eq!(event.error.as_deref(), Some(errors::INVALID_REGISTRATION));
    assert_eq!(event.detail(details::USERNAME), None);
    Ok(())
}

/// The profile form checks the whole form and fills in the new user.
#[tokio::test]
async fn test_profile_form_checks_email_and_copies_fields() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.create_user("taken", "taken@example.com", true).await;
    let validator = validator(&env, ValidatorProfile::ProfileForm, &config(&env))?;

    let mut ctx = registration(&env, "newbie").with_form_value(fields::EMAIL, "taken@example.com");
    let verdict = validator.validate(&mut ctx).await?;

    assert_eq!(verdict.reason(), Some(RejectReason::EmailInUse));
    assert!(verdict.has_error_on(fields::EMAIL));
    assert_eq!(env.hook_calls().await, 0);
    let event = ctx.build_event();
    assert_eq!(event.error.as_deref(), Some(errors::EMAIL_IN_USE));
    assert_eq!(event.detail(details::EMAIL), Some("taken@example.com"));

    let ctx = registration(&env, "newbie");
    let mut user = User::new(env.realm.id, "placeholder");
    validator.success(&ctx, &mut user);
    assert_eq!(user.username, "newbie");
    assert_eq!(user.email.as_deref(), Some("new@example.com"));
    assert_eq!(user.full_name().as_deref(), Some("New User"));
    Ok(())
}

/// The profile form refuses to start without a denylist.
#[tokio::test]
async fn test_profile_form_requires_denylist() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let config = AuthenticatorConfig::new().with(USERNAME_REGEX, "[a-z]+");

    let result = RegistrationValidator::new(
        ValidatorProfile::ProfileForm,
        &config,
        env.users.clone(),
        env.client.clone(),
    );

    assert!(result.is_err_and(|e| e.is_configuration()));
    Ok(())
}
