//! User storage provider trait.

use async_trait::async_trait;
use kc_model::User;
use uuid::Uuid;

use crate::error::StorageResult;

/// Read access to the users of a realm.
///
/// Implementations must be thread-safe and support concurrent access.
/// Lookups are exact: username and email matching rules (case folding,
/// normalisation) belong to the backend.
#[async_trait]
pub trait UserProvider: Send + Sync {
    /// Gets a user by ID.
    async fn get_by_id(&self, realm_id: Uuid, id: Uuid) -> StorageResult<Option<User>>;

    /// Gets a user by username.
    async fn get_by_username(&self, realm_id: Uuid, username: &str) -> StorageResult<Option<User>>;

    /// Gets a user by email.
    async fn get_by_email(&self, realm_id: Uuid, email: &str) -> StorageResult<Option<User>>;

    /// Checks whether any user in the realm already uses this email.
    async fn email_exists(&self, realm_id: Uuid, email: &str) -> StorageResult<bool> {
        Ok(self.get_by_email(realm_id, email).await?.is_some())
    }
}
