use async_trait::async_trait;
use uuid::Uuid;

use crate::models::profile::UserProfile;

/// Storage for the one-to-one user profile. Every write to the profile table
/// goes through this trait.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Returns the stored profile without creating one.
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, sqlx::Error>;

    /// Returns the stored profile, creating a default one on first access.
    /// Repeated or concurrent calls never produce more than one row.
    async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile, sqlx::Error>;

    /// Sets the user's active flag and the profile's `invite_pending` flag
    /// together, creating the profile if needed.
    async fn apply_invite_state(
        &self,
        user_id: Uuid,
        is_active: bool,
        invite_pending: bool,
    ) -> Result<UserProfile, sqlx::Error>;
}
