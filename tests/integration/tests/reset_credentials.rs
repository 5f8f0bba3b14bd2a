//! Reset-credential "choose user" tests.

use kc_auth::form::{fields, messages, pages};
use kc_auth::resolver::{notes, ENABLE_INVALID_PROMPT, HOOK_URL};
use kc_auth::{AuthContext, Authenticator, AuthenticatorResult, ResetCredentialChooseUser};
use kc_core::event::{details, errors, EventType};
use kc_core::AuthenticatorConfig;

use crate::common::TestEnv;

fn resolver(env: &TestEnv, reveal: bool) -> ResetCredentialChooseUser {
    let mut config = AuthenticatorConfig::new().with(HOOK_URL, env.hook_url());
    if reveal {
        config = config.with(ENABLE_INVALID_PROMPT, "true");
    }
    ResetCredentialChooseUser::new(&config, env.users.clone(), env.client.clone())
}

fn reset_request(env: &TestEnv, username: &str) -> AuthContext {
    AuthContext::new(env.realm.clone(), EventType::ResetPassword)
        .with_form_value(fields::USERNAME, username)
}

/// A user identified by an action token skips the form, lookup and hook.
#[tokio::test]
async fn test_action_token_skips_choose_user() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.hook_answers(200, "yes").await;
    let alice = env.create_user("alice", "alice@example.com", true).await;
    let resolver = resolver(&env, true);

    let mut ctx = AuthContext::new(env.realm.clone(), EventType::ResetPassword)
        .with_note(notes::ACTION_TOKEN_USER_ID, alice.id.to_string());

    assert!(resolver.authenticate(&mut ctx).await?.is_success());
    let resolution = resolver.resolve(&mut ctx).await?;

    assert!(resolution.result.is_success());
    assert!(resolution.identity.is_short_circuited());
    assert_eq!(ctx.user(), Some(&alice));
    assert_eq!(env.hook_calls().await, 0);
    Ok(())
}

/// The first visit renders the form.
#[tokio::test]
async fn test_first_visit_renders_form() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let resolver = resolver(&env, false);

    let mut ctx = AuthContext::new(env.realm.clone(), EventType::ResetPassword);
    let result = resolver.authenticate(&mut ctx).await?;

    assert_eq!(result, AuthenticatorResult::challenge(pages::RESET_PASSWORD));
    Ok(())
}

/// Unknown identifier, silent policy, hook says "no": silent re-prompt.
#[tokio::test]
async fn test_unknown_user_silent_reprompt() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.hook_answers(200, "no").await;
    let resolver = resolver(&env, false);

    let mut ctx = reset_request(&env, "ghost");
    let result = resolver.action(&mut ctx).await?;

    assert_eq!(result, AuthenticatorResult::challenge(pages::RESET_PASSWORD));
    assert_eq!(result.error_message(), None);
    assert_eq!(env.hook_calls().await, 1);
    assert_eq!(ctx.note(notes::ATTEMPTED_USERNAME), Some("ghost"));

    let sent = ctx.sent_events();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].event_type, EventType::ResetPasswordError);
    assert_eq!(sent[0].error.as_deref(), Some(errors::USER_NOT_FOUND));
    assert_eq!(sent[0].detail(details::USERNAME), Some("ghost"));
    Ok(())
}

/// Unknown identifier, revealing policy, hook says "yes": the veto message
/// replaces the generic invalid-user message.
#[tokio::test]
async fn test_unknown_user_vetoed() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.hook_answers(200, "yes").await;
    let resolver = resolver(&env, true);

    let result = resolver.action(&mut reset_request(&env, "ghost")).await?;

    assert_eq!(
        result,
        AuthenticatorResult::challenge_with_error(
            pages::RESET_PASSWORD,
            Some(messages::RESET_PASSWORD_PREVENTED_EXTERNAL),
        )
    );
    Ok(())
}

/// Unknown identifier, revealing policy, hook unreachable: invalid user.
#[tokio::test]
async fn test_unknown_user_revealed_when_hook_fails() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.hook_answers(502, "").await;
    let resolver = resolver(&env, true);

    let result = resolver.action(&mut reset_request(&env, "ghost")).await?;

    assert_eq!(result.error_message(), Some(messages::INVALID_USER));
    Ok(())
}

/// Users are found by email when the realm allows it.
#[tokio::test]
async fn test_lookup_by_email() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let alice = env.create_user("alice", "alice@example.com", true).await;
    let resolver = resolver(&env, false);

    let mut ctx = reset_request(&env, "  alice@example.com ");
    let result = resolver.action(&mut ctx).await?;

    assert!(result.is_success());
    assert_eq!(ctx.user(), Some(&alice));
    assert_eq!(env.hook_calls().await, 0);
    Ok(())
}

/// Disabled accounts never advance and only show why when revealing.
#[tokio::test]
async fn test_disabled_user() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.hook_answers(200, "yes").await;
    let bob = env.create_user("bob", "bob@example.com", false).await;

    let mut ctx = reset_request(&env, "bob");
    let result = resolver(&env, false).action(&mut ctx).await?;
    assert_eq!(result, AuthenticatorResult::challenge(pages::RESET_PASSWORD));
    assert_eq!(ctx.user(), None);
    assert_eq!(ctx.sent_events()[0].error.as_deref(), Some(errors::USER_DISABLED));
    assert_eq!(ctx.sent_events()[0].user_id, Some(bob.id));

    let result = resolver(&env, true)
        .action(&mut reset_request(&env, "bob"))
        .await?;
    assert_eq!(result.error_message(), Some(messages::ACCOUNT_DISABLED));
    assert_eq!(env.hook_calls().await, 0);
    Ok(())
}

/// An empty submission is a failure challenge.
#[tokio::test]
async fn test_missing_username() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let resolver = resolver(&env, true);

    let mut ctx = reset_request(&env, "");
    let result = resolver.action(&mut ctx).await?;

    assert_eq!(
        result,
        AuthenticatorResult::failure_challenge(pages::RESET_PASSWORD, messages::MISSING_USERNAME)
    );
    assert_eq!(ctx.build_event().error.as_deref(), Some(errors::USERNAME_MISSING));
    Ok(())
}
