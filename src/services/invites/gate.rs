use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::{
    db::profile_repository::ProfileRepository,
    models::user::User,
    services::account_events::{AccountEventError, AccountEventListener, ExternalLogin},
};

use super::policy::{self, Activation, InviteMode};

/// Applies the invite-only policy to signups and external logins.
pub struct InviteGate {
    profiles: Arc<dyn ProfileRepository>,
    mode: InviteMode,
}

impl InviteGate {
    pub fn new(profiles: Arc<dyn ProfileRepository>, mode: InviteMode) -> Self {
        Self { profiles, mode }
    }

    async fn apply(&self, user: &mut User, activation: Activation) -> Result<(), AccountEventError> {
        self.profiles
            .apply_invite_state(user.id, activation.is_active, activation.invite_pending)
            .await?;
        user.is_active = activation.is_active;
        Ok(())
    }
}

#[async_trait]
impl AccountEventListener for InviteGate {
    async fn user_signed_up(&self, user: &mut User) -> Result<(), AccountEventError> {
        let activation = policy::on_signup(self.mode, &user.email);
        self.apply(user, activation).await?;
        info!(
            user_id = %user.id,
            mode = ?self.mode,
            is_active = activation.is_active,
            invite_pending = activation.invite_pending,
            "applied invite policy to signup"
        );
        Ok(())
    }

    async fn pre_external_login(&self, login: &mut ExternalLogin) -> Result<(), AccountEventError> {
        if self.mode == InviteMode::InviteOnly {
            return Ok(());
        }

        let profile = self.profiles.get_profile(login.user.id).await?;
        match policy::on_external_login(self.mode, profile.invite_pending) {
            Some(activation) => {
                self.apply(&mut login.user, activation).await?;
                info!(
                    user_id = %login.user.id,
                    provider = %login.provider,
                    "released pending invite on external login"
                );
            }
            None => debug!(user_id = %login.user.id, "no pending invite to release"),
        }
        Ok(())
    }
}
