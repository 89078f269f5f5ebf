use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error};
use uuid::Uuid;

use crate::{
    models::{experiment::ExperimentSummary, me::MeResponse},
    responses::JsonResponse,
    routes::{auth::AuthSession, request_origin},
    AppState,
};

/// `GET /api/me`. Anonymous callers, and sessions whose user is gone or
/// inactive, get an empty object rather than an error.
pub async fn handle_me(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    session: Option<AuthSession>,
) -> Response {
    let Some(AuthSession(claims)) = session else {
        return anonymous();
    };

    let Ok(user_id) = Uuid::parse_str(&claims.id) else {
        debug!(id = %claims.id, "session carries a malformed user id");
        return anonymous();
    };

    let user = match app_state.db.find_user_by_id(user_id).await {
        Ok(Some(user)) if user.is_active => user,
        Ok(_) => return anonymous(),
        Err(err) => {
            error!(?err, %user_id, "failed to load current user");
            return JsonResponse::server_error("Failed to load user").into_response();
        }
    };

    let installed = match app_state
        .experiments
        .list_installed_experiments(user.id)
        .await
    {
        Ok(experiments) => experiments,
        Err(err) => {
            error!(?err, user_id = %user.id, "failed to load installed experiments");
            return JsonResponse::server_error("Failed to load installed experiments")
                .into_response();
        }
    };

    let origin = request_origin(&app_state.config, &headers);
    Json(MeResponse {
        id: user.email,
        addon: app_state.config.addon.clone(),
        installed: installed
            .iter()
            .map(|experiment| ExperimentSummary::from_experiment(experiment, &origin))
            .collect(),
    })
    .into_response()
}

fn anonymous() -> Response {
    Json(json!({})).into_response()
}
