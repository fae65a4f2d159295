//! The three proxy routes.
//!
//! Handlers only assemble the [`Invocation`] envelope and hand it to the
//! configured gateway; every behavioral difference between deployments
//! lives behind the [`ImageGateway`] trait.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::{HeaderMap, Uri};
use axum::routing::{get, post};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::Value;
use utoipa::OpenApi;

use crate::error::ProxyError;
use crate::handlers::ImageGateway;
use crate::invocation::{FnResponse, Invocation};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(submit_image, poll_task, get_image))]
pub struct ProxyApi;

/// Register the proxy routes.
pub fn router(state: &AppState) -> Router<Arc<AppState>> {
    Router::new()
        .route("/submitImage", post(submit_image))
        .route("/pollTask/{taskID}", get(poll_task))
        .route("/getImage/{*imagePath}", get(get_image))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
}

/// Submit an image for variation generation (`POST /submitImage`).
///
/// The raw request body is the image; `size` and `count` tune the upstream
/// request and fall back to configured defaults.
#[utoipa::path(
    post,
    path = "/submitImage",
    tag = "proxy",
    params(
        ("size" = Option<String>, Query, description = "Square output size, e.g. 1024x1024"),
        ("count" = Option<i64>, Query, description = "Number of variations, 1..=10"),
    ),
    request_body(content = Vec<u8>, description = "Raw image bytes"),
    responses(
        (status = 200, description = "Provider task or variation list", body = Value),
        (status = 400, description = "Malformed request"),
        (status = 401, description = "Bad bearer token"),
        (status = 502, description = "Upstream failure"),
    )
)]
pub async fn submit_image(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<FnResponse, ProxyError> {
    let invocation = envelope_request(&uri, &headers, HashMap::new(), query, &body);
    state.gateway.submit_image(&invocation).await
}

/// Poll a submitted generation task (`GET /pollTask/{taskID}`).
#[utoipa::path(
    get,
    path = "/pollTask/{taskID}",
    tag = "proxy",
    params(
        ("taskID" = String, Path, description = "Task handle returned by submitImage"),
    ),
    responses(
        (status = 200, description = "Current task document", body = Value),
        (status = 400, description = "Malformed request"),
        (status = 401, description = "Bad bearer token"),
        (status = 502, description = "Upstream failure"),
    )
)]
pub async fn poll_task(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
    Path(task_id): Path<String>,
) -> Result<FnResponse, ProxyError> {
    let path_parameters = HashMap::from([("taskID".to_owned(), task_id)]);
    let invocation = envelope_request(&uri, &headers, path_parameters, HashMap::new(), b"");
    state.gateway.poll_task(&invocation).await
}

/// Fetch one generated image (`GET /getImage/{imagePath}`).
///
/// The wildcard suffix and the verbatim query string select the stored blob;
/// the response is always a freshly transcoded JPEG.
#[utoipa::path(
    get,
    path = "/getImage/{imagePath}",
    tag = "proxy",
    params(
        ("imagePath" = String, Path, description = "Blob path suffix"),
    ),
    responses(
        (status = 200, description = "Transcoded JPEG image, base64 in the envelope"),
        (status = 400, description = "Malformed request"),
        (status = 502, description = "Upstream failure"),
    )
)]
pub async fn get_image(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
    Path(image_path): Path<String>,
) -> Result<FnResponse, ProxyError> {
    let path_parameters = HashMap::from([("imagePath".to_owned(), image_path)]);
    let invocation = envelope_request(&uri, &headers, path_parameters, HashMap::new(), b"");
    state.gateway.get_image(&invocation).await
}

/// Assemble the hosting-boundary envelope for one request.
fn envelope_request(
    uri: &Uri,
    headers: &HeaderMap,
    path_parameters: HashMap<String, String>,
    query_string_parameters: HashMap<String, String>,
    body: &[u8],
) -> Invocation {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.as_str().to_ascii_lowercase(), value.to_owned()))
        })
        .collect();

    Invocation {
        headers,
        path_parameters,
        query_string_parameters,
        raw_path: uri.path().to_owned(),
        raw_query_string: uri.query().unwrap_or_default().to_owned(),
        body: STANDARD.encode(body),
        is_base64_encoded: !body.is_empty(),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
