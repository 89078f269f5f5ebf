use crate::{models::user::ExternalIdentity, services::oauth::fxa::errors::FxaAuthError};
use async_trait::async_trait;

pub const FXA_PROVIDER: &str = "fxa";

#[async_trait]
pub trait FxaOAuthService: Send + Sync {
    fn authorization_url(&self, state: &str) -> String;
    async fn exchange_code_for_token(&self, code: &str) -> Result<String, FxaAuthError>;
    async fn fetch_identity(&self, access_token: &str) -> Result<ExternalIdentity, FxaAuthError>;
}
