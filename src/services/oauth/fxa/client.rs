use crate::{
    config::OAuthProviderConfig,
    models::user::ExternalIdentity,
    services::oauth::fxa::{
        errors::FxaAuthError,
        service::{FxaOAuthService, FXA_PROVIDER},
    },
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

pub struct FxaOAuthClient {
    pub client: Client,
    pub settings: OAuthProviderConfig,
}

fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

/// Maps the profile server response onto an identity. `uid` and `email` are
/// required; `displayName` falls back to empty.
pub fn identity_from_profile(profile: &Value) -> Result<ExternalIdentity, FxaAuthError> {
    let uid = profile["uid"]
        .as_str()
        .filter(|uid| !uid.is_empty())
        .ok_or(FxaAuthError::InvalidProfile)?;
    let email = profile["email"]
        .as_str()
        .map(|email| email.trim().to_lowercase())
        .filter(|email| !email.is_empty())
        .ok_or(FxaAuthError::NoEmailFound)?;
    let display_name = profile["displayName"].as_str().unwrap_or("").to_string();

    Ok(ExternalIdentity {
        provider: FXA_PROVIDER.to_string(),
        uid: uid.to_string(),
        email,
        display_name,
    })
}

#[async_trait]
impl FxaOAuthService for FxaOAuthClient {
    fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&scope=profile&state={}&action=signin",
            endpoint(&self.settings.oauth_endpoint, "authorization"),
            urlencoding::encode(&self.settings.client_id),
            urlencoding::encode(&self.settings.redirect_uri),
            urlencoding::encode(state),
        )
    }

    async fn exchange_code_for_token(&self, code: &str) -> Result<String, FxaAuthError> {
        let res = self
            .client
            .post(endpoint(&self.settings.oauth_endpoint, "token"))
            .json(&json!({
                "client_id": self.settings.client_id,
                "client_secret": self.settings.client_secret,
                "code": code,
            }))
            .send()
            .await
            .map_err(|_| FxaAuthError::TokenExchangeFailed)?;

        if !res.status().is_success() {
            return Err(FxaAuthError::TokenExchangeFailed);
        }

        let token_json: Value = res
            .json()
            .await
            .map_err(|_| FxaAuthError::InvalidTokenJson)?;
        token_json["access_token"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or(FxaAuthError::InvalidTokenJson)
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<ExternalIdentity, FxaAuthError> {
        let res = self
            .client
            .get(endpoint(&self.settings.profile_endpoint, "profile"))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|_| FxaAuthError::ProfileFetchFailed)?;

        if !res.status().is_success() {
            return Err(FxaAuthError::ProfileFetchFailed);
        }

        let profile: Value = res
            .json()
            .await
            .map_err(|_| FxaAuthError::InvalidProfile)?;
        identity_from_profile(&profile)
    }
}
