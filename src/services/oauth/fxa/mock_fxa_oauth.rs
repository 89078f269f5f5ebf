use super::{errors::FxaAuthError, service::FxaOAuthService};
use crate::models::user::ExternalIdentity;

/// Returns a fixed token and identity. With no identity configured, the
/// profile fetch fails.
#[derive(Default)]
pub struct MockFxaOAuth {
    pub token: String,
    pub identity: Option<ExternalIdentity>,
}

#[async_trait::async_trait]
impl FxaOAuthService for MockFxaOAuth {
    fn authorization_url(&self, state: &str) -> String {
        format!("https://accounts.example.com/authorization?state={}", state)
    }

    async fn exchange_code_for_token(&self, _code: &str) -> Result<String, FxaAuthError> {
        Ok(self.token.clone())
    }

    async fn fetch_identity(&self, _access_token: &str) -> Result<ExternalIdentity, FxaAuthError> {
        self.identity
            .clone()
            .ok_or(FxaAuthError::ProfileFetchFailed)
    }
}
