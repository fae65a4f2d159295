//! Unified server error type.
//!
//! Every handler returns `Result<FnResponse, ProxyError>`; the error
//! implements [`axum::response::IntoResponse`] so failures are converted to
//! a JSON-body HTTP response with an appropriate status code.
//!
//! **Security note:** pipeline, upstream, and I/O failures are logged with
//! full detail but only a generic message is returned to the caller, so
//! converter argv, remote URLs, and filesystem paths never leak to clients.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use easel_magick::ConvertError;
use easel_upstream::UpstreamError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// All errors that can occur in the proxy request lifecycle.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The bearer token is missing the expected shape.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The conversion pipeline failed; fatal for the request, never retried.
    #[error("conversion failed: {0}")]
    Convert(#[from] ConvertError),

    /// The remote image service failed and the body carried nothing worth
    /// passing through.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] UpstreamError),

    /// Local file I/O failed (fixture images).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            // Client-facing errors: expose the message directly.
            ProxyError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ProxyError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),

            // Internal errors: log the full detail, return a generic message.
            ProxyError::Convert(e) => {
                error!(error = %e, "conversion pipeline failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "image conversion failed".to_owned(),
                )
            }
            ProxyError::Upstream(e) => {
                error!(error = %e, "upstream request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream request failed".to_owned(),
                )
            }
            ProxyError::Io(e) => {
                error!(error = %e, "i/o error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}
