use crate::config::Config;
use crate::db::{
    experiment_repository::ExperimentRepository, profile_repository::ProfileRepository,
    user_repository::UserRepository,
};
use crate::services::account_events::AccountEvents;
use crate::services::oauth::fxa::service::FxaOAuthService;
use crate::utils::jwt::{JwtKeyProvider, JwtKeys};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn UserRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub experiments: Arc<dyn ExperimentRepository>,
    pub fxa_oauth: Arc<dyn FxaOAuthService>,
    pub account_events: AccountEvents,
    pub config: Arc<Config>,
    pub jwt_keys: Arc<JwtKeys>,
}

impl JwtKeyProvider for AppState {
    fn jwt_keys(&self) -> &JwtKeys {
        &self.jwt_keys
    }

    fn jwt_issuer(&self) -> &str {
        &self.config.jwt_issuer
    }

    fn jwt_audience(&self) -> &str {
        &self.config.jwt_audience
    }
}

#[cfg(test)]
pub fn test_jwt_keys() -> Arc<JwtKeys> {
    Arc::new(
        JwtKeys::from_secret("0123456789abcdef0123456789abcdef")
            .expect("test JWT secret should be valid"),
    )
}

/// State backed entirely by one `MockDb`, with the invite gate subscribed in
/// the mode given by `config.invite_only_mode`.
#[cfg(test)]
pub fn test_state(
    db: Arc<crate::db::mock_db::MockDb>,
    fxa_oauth: Arc<dyn FxaOAuthService>,
    config: Config,
) -> AppState {
    use crate::services::invites::InviteGate;

    let account_events = AccountEvents::new().subscribe(Arc::new(InviteGate::new(
        db.clone(),
        config.invite_mode(),
    )));
    AppState {
        db: db.clone(),
        profiles: db.clone(),
        experiments: db,
        fxa_oauth,
        account_events,
        config: Arc::new(config),
        jwt_keys: test_jwt_keys(),
    }
}
