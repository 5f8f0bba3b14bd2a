//! Common test utilities and fixtures.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use kc_auth::{HookClient, HookSettings};
use kc_model::{Realm, User};
use kc_storage::{StorageResult, UserProvider};
use tokio::sync::RwLock;
use uuid::Uuid;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// In-memory user store keyed by user ID.
#[derive(Default)]
pub struct InMemoryUsers {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUsers {
    /// Adds a user.
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserProvider for InMemoryUsers {
    async fn get_by_id(&self, realm_id: Uuid, id: Uuid) -> StorageResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .get(&id)
            .filter(|u| u.realm_id == realm_id)
            .cloned())
    }

    async fn get_by_username(&self, realm_id: Uuid, username: &str) -> StorageResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.realm_id == realm_id && u.username == username)
            .cloned())
    }

    async fn get_by_email(&self, realm_id: Uuid, email: &str) -> StorageResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.realm_id == realm_id && u.email.as_deref() == Some(email))
            .cloned())
    }
}

/// Test environment with a realm, a user store and a hook endpoint.
pub struct TestEnv {
    /// Realm every test runs in.
    pub realm: Realm,
    /// Users of that realm.
    pub users: Arc<InMemoryUsers>,
    /// Mock hook endpoint.
    pub hook: MockServer,
    /// Client used to query the hook.
    pub client: HookClient,
}

impl TestEnv {
    /// Creates a new test environment.
    pub async fn new() -> anyhow::Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("kc_auth=debug")
            .with_test_writer()
            .try_init();

        let client = HookClient::new(
            &HookSettings::default().timeout(std::time::Duration::from_secs(2)),
        )?;

        Ok(Self {
            realm: Realm::new("test"),
            users: Arc::new(InMemoryUsers::default()),
            hook: MockServer::start().await,
            client,
        })
    }

    /// Adds a user to the realm and returns it.
    pub async fn create_user(&self, username: &str, email: &str, enabled: bool) -> User {
        let user = User::new(self.realm.id, username)
            .with_email(email)
            .with_enabled(enabled);
        self.users.insert(user.clone()).await;
        user
    }

    /// Makes the hook answer every request with `status` and `body`.
    pub async fn hook_answers(&self, status: u16, body: &str) {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.hook)
            .await;
    }

    /// Base URL of the hook endpoint.
    pub fn hook_url(&self) -> String {
        self.hook.uri()
    }

    /// Number of requests the hook received so far.
    pub async fn hook_calls(&self) -> usize {
        self.hook
            .received_requests()
            .await
            .map_or(0, |requests| requests.len())
    }
}
