use std::{collections::HashSet, env};

use crate::routes::auth::claims::Claims;
use jsonwebtoken::{
    decode, encode, errors::Error, Algorithm, DecodingKey, EncodingKey, Header, TokenData,
    Validation,
};
use thiserror::Error;

/// Minimum acceptable size for the JWT secret in bytes.
pub const MIN_JWT_SECRET_LENGTH: usize = 32;
/// Minimum number of unique bytes expected for the JWT secret to avoid trivially guessable values.
const MIN_UNIQUE_JWT_BYTES: usize = 8;

#[derive(Debug, Error)]
pub enum JwtSecretError {
    #[error("JWT_SECRET must be set")]
    Missing,
    #[error("JWT_SECRET must be at least {required} bytes, but {actual} bytes were provided")]
    TooShort { actual: usize, required: usize },
    #[error(
        "JWT_SECRET must contain sufficient entropy (at least {required} unique bytes); only {actual} unique bytes found"
    )]
    LowEntropy { actual: usize, required: usize },
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys").finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn from_env() -> Result<Self, JwtSecretError> {
        let value = env::var("JWT_SECRET").map_err(|_| JwtSecretError::Missing)?;
        Self::from_secret(value)
    }

    pub fn from_secret(secret: impl AsRef<[u8]>) -> Result<Self, JwtSecretError> {
        let bytes = secret.as_ref();
        validate_secret(bytes)?;

        Ok(Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        })
    }
}

/// Implemented by router state so extractors can verify session tokens.
pub trait JwtKeyProvider {
    fn jwt_keys(&self) -> &JwtKeys;
    fn jwt_issuer(&self) -> &str;
    fn jwt_audience(&self) -> &str;
}

fn validate_secret(secret: &[u8]) -> Result<(), JwtSecretError> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(JwtSecretError::TooShort {
            actual: secret.len(),
            required: MIN_JWT_SECRET_LENGTH,
        });
    }

    let unique = secret.iter().copied().collect::<HashSet<_>>().len();
    if unique < MIN_UNIQUE_JWT_BYTES {
        return Err(JwtSecretError::LowEntropy {
            actual: unique,
            required: MIN_UNIQUE_JWT_BYTES,
        });
    }

    Ok(())
}

pub fn create_jwt(
    mut claims: Claims,
    keys: &JwtKeys,
    issuer: &str,
    audience: &str,
) -> Result<String, Error> {
    claims.iss = issuer.to_owned();
    claims.aud = audience.to_owned();
    encode(&Header::default(), &claims, &keys.encoding)
}

pub fn decode_jwt(
    token: &str,
    keys: &JwtKeys,
    issuer: &str,
    audience: &str,
) -> Result<TokenData<Claims>, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[audience]);
    validation.set_issuer(&[issuer]);
    validation.validate_exp = true;
    validation.leeway = 0;
    decode::<Claims>(token, &keys.decoding, &validation)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn claims(exp_offset: i64) -> Claims {
        Claims {
            id: "0b7e6a2c-3f4d-4a8e-9c1b-2d5e6f708192".into(),
            email: "johndoe@example.com".into(),
            exp: (chrono::Utc::now().timestamp() + exp_offset) as usize,
            iss: String::new(),
            aud: String::new(),
        }
    }

    #[test]
    fn short_secrets_are_rejected() {
        assert!(matches!(
            JwtKeys::from_secret("too-short"),
            Err(JwtSecretError::TooShort { actual: 9, .. })
        ));
    }

    #[test]
    fn low_entropy_secrets_are_rejected() {
        assert!(matches!(
            JwtKeys::from_secret("a".repeat(40)),
            Err(JwtSecretError::LowEntropy { actual: 1, .. })
        ));
    }

    #[test]
    fn round_trip_sets_issuer_and_audience() {
        let keys = JwtKeys::from_secret(SECRET).unwrap();
        let token = create_jwt(claims(3600), &keys, "iss", "aud").unwrap();

        let decoded = decode_jwt(&token, &keys, "iss", "aud").unwrap();

        assert_eq!(decoded.claims.email, "johndoe@example.com");
        assert_eq!(decoded.claims.iss, "iss");
        assert_eq!(decoded.claims.aud, "aud");
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let keys = JwtKeys::from_secret(SECRET).unwrap();
        let token = create_jwt(claims(3600), &keys, "iss", "aud").unwrap();

        assert!(decode_jwt(&token, &keys, "iss", "other").is_err());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let keys = JwtKeys::from_secret(SECRET).unwrap();
        let token = create_jwt(claims(-60), &keys, "iss", "aud").unwrap();

        assert!(decode_jwt(&token, &keys, "iss", "aud").is_err());
    }
}
