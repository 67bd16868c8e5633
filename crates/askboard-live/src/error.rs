//! Error types for the live server's REST layer.
//!
//! [`LiveError`] converts into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors returned by REST handlers.
#[derive(Debug, thiserror::Error)]
pub enum LiveError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A question id could not be parsed from the request path.
    #[error("invalid question id: {0}")]
    InvalidId(String),
}

impl IntoResponse for LiveError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::InvalidId(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
