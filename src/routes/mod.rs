pub mod auth;
pub mod experiments;
pub mod me;

use axum::http::{header, HeaderMap};

use crate::config::Config;

/// Absolute origin used to build resource URLs: `SITE_ORIGIN` when set,
/// otherwise the request's `Host` over plain http.
pub fn request_origin(config: &Config, headers: &HeaderMap) -> String {
    if let Some(origin) = &config.site_origin {
        return origin.trim_end_matches('/').to_string();
    }

    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .filter(|host| !host.is_empty())
        .unwrap_or("localhost");
    format!("http://{}", host)
}
