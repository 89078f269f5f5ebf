use std::convert::Infallible;

use axum::{extract::OptionalFromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::routes::auth::claims::Claims;
use crate::utils::jwt::{decode_jwt, JwtKeyProvider};

pub const AUTH_COOKIE: &str = "auth_token";

/// Identity carried by the `auth_token` cookie. Extracted as
/// `Option<AuthSession>`: a missing or invalid token is an anonymous request,
/// never a rejection.
#[derive(Debug, PartialEq)]
pub struct AuthSession(pub Claims);

impl<S> OptionalFromRequestParts<S> for AuthSession
where
    S: JwtKeyProvider + Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = jar.get(AUTH_COOKIE) else {
            return Ok(None);
        };

        match decode_jwt(
            token.value(),
            state.jwt_keys(),
            state.jwt_issuer(),
            state.jwt_audience(),
        ) {
            Ok(data) => Ok(Some(AuthSession(data.claims))),
            Err(err) => {
                debug!(?err, "ignoring invalid session token");
                Ok(None)
            }
        }
    }
}
