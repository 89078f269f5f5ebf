use async_trait::async_trait;
use uuid::Uuid;

use crate::models::user::{ExternalIdentity, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn find_user_by_external_account(
        &self,
        provider: &str,
        uid: &str,
    ) -> Result<Option<User>, sqlx::Error>;
    /// Creates the user, links the external account and writes the profile's
    /// `invite_pending` flag in one transaction, so a new account never exists
    /// without its invite state.
    async fn create_user_with_external_account(
        &self,
        identity: &ExternalIdentity,
        is_active: bool,
        invite_pending: bool,
    ) -> Result<User, sqlx::Error>;
}
