use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::{
    models::experiment::ExperimentSummary, responses::JsonResponse, routes::request_origin,
    AppState,
};

pub async fn list_experiments(State(app_state): State<AppState>, headers: HeaderMap) -> Response {
    match app_state.experiments.list_experiments().await {
        Ok(experiments) => {
            let origin = request_origin(&app_state.config, &headers);
            let summaries: Vec<ExperimentSummary> = experiments
                .iter()
                .map(|experiment| ExperimentSummary::from_experiment(experiment, &origin))
                .collect();
            Json(summaries).into_response()
        }
        Err(err) => {
            error!(?err, "failed to list experiments");
            JsonResponse::server_error("Failed to load experiments").into_response()
        }
    }
}

pub async fn get_experiment(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(experiment_id): Path<i64>,
) -> Response {
    match app_state.experiments.find_experiment(experiment_id).await {
        Ok(Some(experiment)) => {
            let origin = request_origin(&app_state.config, &headers);
            Json(ExperimentSummary::from_experiment(&experiment, &origin)).into_response()
        }
        Ok(None) => JsonResponse::not_found("Experiment not found").into_response(),
        Err(err) => {
            error!(?err, experiment_id, "failed to load experiment");
            JsonResponse::server_error("Failed to load experiment").into_response()
        }
    }
}
