use std::{env, net::SocketAddr};

use thiserror::Error;

use crate::models::me::AddonMetadata;
use crate::services::invites::InviteMode;

pub const DEFAULT_ADDON_NAME: &str = "Idea Town";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_FXA_OAUTH_ENDPOINT: &str = "https://oauth.accounts.firefox.com/v1";
pub const DEFAULT_FXA_PROFILE_ENDPOINT: &str = "https://profile.accounts.firefox.com/v1";
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 30;
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} must be `true` or `false`, got `{value}`")]
    InvalidBool { key: &'static str, value: String },
    #[error("{key} has an invalid value `{value}`")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct OAuthProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub oauth_endpoint: String,
    pub profile_endpoint: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub frontend_origin: String,
    /// Origin used for absolute API URLs. Falls back to the request's Host.
    pub site_origin: Option<String>,
    pub bind_addr: SocketAddr,
    /// `ACCOUNT_INVITE_ONLY_MODE`
    pub invite_only_mode: bool,
    pub addon: AddonMetadata,
    pub fxa: OAuthProviderConfig,
    pub auth_cookie_secure: bool,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub session_ttl_hours: i64,
    pub rate_limit_ms: u64,
    pub rate_limit_burst: u32,
}

/// Parses the boolean settings. Only `true` and `false` are recognized.
pub fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: value.to_string(),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok(); // Load .env file
        Self::from_source(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests never touch the
    /// process environment.
    pub fn from_source<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            get(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let optional = |key: &'static str| get(key).filter(|value| !value.trim().is_empty());

        let invite_only_mode = match optional("ACCOUNT_INVITE_ONLY_MODE") {
            Some(value) => parse_bool("ACCOUNT_INVITE_ONLY_MODE", &value)?,
            None => false,
        };
        let auth_cookie_secure = match optional("AUTH_COOKIE_SECURE") {
            Some(value) => parse_bool("AUTH_COOKIE_SECURE", &value)?,
            None => true,
        };

        let bind_addr_raw = optional("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = parse_number::<SocketAddr>("BIND_ADDR", &bind_addr_raw)?;

        let session_ttl_hours = match optional("SESSION_TTL_HOURS") {
            Some(value) => parse_number("SESSION_TTL_HOURS", &value)?,
            None => DEFAULT_SESSION_TTL_HOURS,
        };
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&session_ttl_hours) {
            return Err(ConfigError::Invalid {
                key: "SESSION_TTL_HOURS",
                value: session_ttl_hours.to_string(),
            });
        }

        // Default: 200ms/token (~5 req/sec)
        let rate_limit_ms = match optional("RATE_LIMITER_MILLISECONDS") {
            Some(value) => parse_number("RATE_LIMITER_MILLISECONDS", &value)?,
            None => 200,
        };
        let rate_limit_burst = match optional("RATE_LIMITER_BURST") {
            Some(value) => parse_number("RATE_LIMITER_BURST", &value)?,
            None => 20,
        };

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            frontend_origin: required("FRONTEND_ORIGIN")?,
            site_origin: optional("SITE_ORIGIN").map(|o| o.trim_end_matches('/').to_string()),
            bind_addr,
            invite_only_mode,
            addon: AddonMetadata {
                name: optional("ADDON_NAME").unwrap_or_else(|| DEFAULT_ADDON_NAME.to_string()),
                url: required("ADDON_URL")?,
            },
            fxa: OAuthProviderConfig {
                client_id: required("FXA_CLIENT_ID")?,
                client_secret: required("FXA_CLIENT_SECRET")?,
                redirect_uri: required("FXA_REDIRECT_URI")?,
                oauth_endpoint: optional("FXA_OAUTH_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_FXA_OAUTH_ENDPOINT.to_string()),
                profile_endpoint: optional("FXA_PROFILE_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_FXA_PROFILE_ENDPOINT.to_string()),
            },
            auth_cookie_secure,
            jwt_issuer: optional("JWT_ISSUER").unwrap_or_else(|| "ideatown".to_string()),
            jwt_audience: optional("JWT_AUDIENCE").unwrap_or_else(|| "ideatown-web".to_string()),
            session_ttl_hours,
            rate_limit_ms,
            rate_limit_burst,
        })
    }

    pub fn invite_mode(&self) -> InviteMode {
        InviteMode::from_invite_only_flag(self.invite_only_mode)
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            database_url: String::new(),
            frontend_origin: "http://localhost:5173".into(),
            site_origin: None,
            bind_addr: DEFAULT_BIND_ADDR.parse().unwrap(),
            invite_only_mode: false,
            addon: AddonMetadata {
                name: DEFAULT_ADDON_NAME.into(),
                url: "http://testserver/static/addon/addon.xpi".into(),
            },
            fxa: OAuthProviderConfig {
                client_id: "stub".into(),
                client_secret: "stub".into(),
                redirect_uri: "http://localhost".into(),
                oauth_endpoint: DEFAULT_FXA_OAUTH_ENDPOINT.into(),
                profile_endpoint: DEFAULT_FXA_PROFILE_ENDPOINT.into(),
            },
            auth_cookie_secure: true,
            jwt_issuer: "test-issuer".into(),
            jwt_audience: "test-audience".into(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            rate_limit_ms: 200,
            rate_limit_burst: 20,
        }
    }
}
