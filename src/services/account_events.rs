use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::user::User;

#[derive(Debug, Error)]
pub enum AccountEventError {
    #[error("account storage failed: {0}")]
    Database(#[from] sqlx::Error),
}

/// An external-provider login that is about to complete for an existing or
/// newly created user.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalLogin {
    pub provider: String,
    pub uid: String,
    pub user: User,
}

/// Receives account lifecycle events. Listeners may update the user they are
/// handed; the caller continues with the updated value.
#[async_trait]
pub trait AccountEventListener: Send + Sync {
    async fn user_signed_up(&self, _user: &mut User) -> Result<(), AccountEventError> {
        Ok(())
    }

    async fn pre_external_login(&self, _login: &mut ExternalLogin) -> Result<(), AccountEventError> {
        Ok(())
    }
}

/// Dispatches account events to listeners in registration order, stopping at
/// the first error.
#[derive(Clone, Default)]
pub struct AccountEvents {
    listeners: Vec<Arc<dyn AccountEventListener>>,
}

impl AccountEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(mut self, listener: Arc<dyn AccountEventListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub async fn user_signed_up(&self, user: &mut User) -> Result<(), AccountEventError> {
        for listener in &self.listeners {
            listener.user_signed_up(user).await?;
        }
        Ok(())
    }

    pub async fn pre_external_login(
        &self,
        login: &mut ExternalLogin,
    ) -> Result<(), AccountEventError> {
        for listener in &self.listeners {
            listener.pre_external_login(login).await?;
        }
        Ok(())
    }
}
