use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{error, info, warn};

use crate::{
    models::user::{ExternalIdentity, User},
    responses::JsonResponse,
    routes::auth::{claims::Claims, session::AUTH_COOKIE},
    services::{
        account_events::ExternalLogin,
        invites::policy,
        oauth::fxa::{errors::FxaAuthError, service::FXA_PROVIDER},
    },
    utils::{jwt::create_jwt, state_token::generate_state_token},
    AppState,
};

const OAUTH_STATE_COOKIE: &str = "oauth_state";

pub async fn fxa_login(State(app_state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let state = generate_state_token();
    let url = app_state.fxa_oauth.authorization_url(&state);

    let oauth_state_cookie = Cookie::build((OAUTH_STATE_COOKIE, state))
        .http_only(true)
        .secure(app_state.config.auth_cookie_secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::minutes(10))
        .build();

    (jar.add(oauth_state_cookie), Redirect::to(&url))
}

pub async fn fxa_callback(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let frontend_origin = app_state.config.frontend_origin.as_str();
    let fail = |err: FxaAuthError| {
        let code = match err {
            FxaAuthError::InvitePending => Some("invite_pending"),
            _ => None,
        };
        JsonResponse::redirect_to_frontend_with_error(frontend_origin, &err.to_string(), code)
            .into_response()
    };

    let Some(code) = params.get("code") else {
        return fail(FxaAuthError::MissingCode);
    };

    let Some(state_param) = params.get("state") else {
        return fail(FxaAuthError::InvalidState);
    };

    let Some(expected_state) = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string()) else {
        return fail(FxaAuthError::MissingStateCookie);
    };

    if state_param != &expected_state {
        return fail(FxaAuthError::InvalidState);
    }

    let access_token = match app_state.fxa_oauth.exchange_code_for_token(code).await {
        Ok(token) => token,
        Err(err) => {
            warn!(%err, "fxa token exchange failed");
            return fail(err);
        }
    };

    let identity = match app_state.fxa_oauth.fetch_identity(&access_token).await {
        Ok(identity) => identity,
        Err(err) => {
            warn!(%err, "fxa profile fetch failed");
            return fail(err);
        }
    };

    let user = match resolve_user(&app_state, &identity).await {
        Ok(user) => user,
        Err(err) => {
            error!(?err, uid = %identity.uid, "fxa login could not be completed");
            return fail(err);
        }
    };

    if !user.is_active {
        let err = match app_state.profiles.find_profile(user.id).await {
            Ok(Some(profile)) if profile.invite_pending => {
                info!(user_id = %user.id, "login held back until invite is granted");
                FxaAuthError::InvitePending
            }
            Ok(_) => {
                info!(user_id = %user.id, "login refused for disabled account");
                FxaAuthError::AccountDisabled
            }
            Err(err) => {
                error!(?err, user_id = %user.id, "failed to load profile of inactive user");
                FxaAuthError::DbError(err)
            }
        };
        return (clear_state_cookie(&app_state), fail(err)).into_response();
    }

    let session_ttl_hours = app_state.config.session_ttl_hours;
    let claims = Claims {
        id: user.id.to_string(),
        email: user.email.clone(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(session_ttl_hours)).timestamp()
            as usize,
        iss: String::new(),
        aud: String::new(),
    };

    let token = match create_jwt(
        claims,
        &app_state.jwt_keys,
        &app_state.config.jwt_issuer,
        &app_state.config.jwt_audience,
    ) {
        Ok(token) => token,
        Err(err) => {
            error!(?err, user_id = %user.id, "failed to sign session token");
            return fail(FxaAuthError::SessionCreationFailed);
        }
    };

    info!(user_id = %user.id, "fxa login succeeded");

    let auth_cookie = Cookie::build((AUTH_COOKIE, token))
        .http_only(true)
        .secure(app_state.config.auth_cookie_secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::hours(session_ttl_hours))
        .build();

    let jar = clear_state_cookie(&app_state).add(auth_cookie);
    let redirect_url = format!("{}/", frontend_origin.trim_end_matches('/'));
    (jar, Redirect::to(&redirect_url)).into_response()
}

fn clear_state_cookie(app_state: &AppState) -> CookieJar {
    let cookie = Cookie::build((OAUTH_STATE_COOKIE, ""))
        .path("/")
        .secure(app_state.config.auth_cookie_secure)
        .max_age(time::Duration::seconds(0))
        .build();
    CookieJar::new().add(cookie)
}

/// Finds or creates the local user for an FxA identity and runs the account
/// events, returning the user as the listeners left it. A new user starts in
/// the invite state the signup policy gives them.
async fn resolve_user(
    app_state: &AppState,
    identity: &ExternalIdentity,
) -> Result<User, FxaAuthError> {
    let events = &app_state.account_events;

    if let Some(user) = app_state
        .db
        .find_user_by_external_account(FXA_PROVIDER, &identity.uid)
        .await?
    {
        let mut login = ExternalLogin {
            provider: FXA_PROVIDER.to_string(),
            uid: identity.uid.clone(),
            user,
        };
        events.pre_external_login(&mut login).await?;
        return Ok(login.user);
    }

    if app_state.db.find_user_by_email(&identity.email).await?.is_some() {
        return Err(FxaAuthError::EmailLinkedElsewhere);
    }

    // The account and its invite state are committed together.
    let signup = policy::on_signup(app_state.config.invite_mode(), &identity.email);
    let user = app_state
        .db
        .create_user_with_external_account(identity, signup.is_active, signup.invite_pending)
        .await?;
    info!(
        user_id = %user.id,
        is_active = signup.is_active,
        "created user from fxa identity"
    );

    let mut login = ExternalLogin {
        provider: FXA_PROVIDER.to_string(),
        uid: identity.uid.clone(),
        user,
    };
    events.pre_external_login(&mut login).await?;

    let mut user = login.user;
    events.user_signed_up(&mut user).await?;
    Ok(user)
}
