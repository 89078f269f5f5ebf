use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct JsonResponse {
    pub status: String,
    pub success: bool,
    pub message: String,
    pub code: Option<String>,
}

impl JsonResponse {
    fn error(status: StatusCode, msg: &str) -> impl IntoResponse {
        (
            status,
            Json(JsonResponse {
                status: "error".to_string(),
                success: false,
                message: msg.to_string(),
                code: None,
            }),
        )
    }

    pub fn success(msg: &str) -> impl IntoResponse {
        (
            StatusCode::OK,
            Json(JsonResponse {
                status: "success".to_string(),
                success: true,
                message: msg.to_string(),
                code: None,
            }),
        )
    }

    pub fn not_found(msg: &str) -> impl IntoResponse {
        Self::error(StatusCode::NOT_FOUND, msg)
    }

    pub fn server_error(msg: &str) -> impl IntoResponse {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    pub fn too_many_requests(msg: &str) -> impl IntoResponse {
        Self::error(StatusCode::TOO_MANY_REQUESTS, msg)
    }

    /// Sends the browser back to the frontend with a message it can show.
    /// `code` lets the frontend pick a dedicated view (e.g. `invite_pending`).
    pub fn redirect_to_frontend_with_error(
        frontend_origin: &str,
        msg: &str,
        code: Option<&str>,
    ) -> impl IntoResponse {
        let mut redirect_url = format!(
            "{}/?error={}",
            frontend_origin.trim_end_matches('/'),
            urlencoding::encode(msg)
        );
        if let Some(code) = code {
            redirect_url.push_str("&code=");
            redirect_url.push_str(&urlencoding::encode(code));
        }
        Redirect::to(&redirect_url).into_response()
    }
}
