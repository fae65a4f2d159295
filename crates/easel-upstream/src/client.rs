//! Thin HTTPS client for the remote image services.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use tracing::trace;

use crate::body::HttpBody;
use crate::error::UpstreamError;

/// Browser User-Agent presented on every outbound request; parts of the
/// remote service reject obvious non-browser clients.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; rv:102.0) Gecko/20100101 Firefox/102.0";

/// HTTPS client for the image endpoints.
///
/// Connections are never reused: the process can sit idle for minutes
/// between requests, long enough for keepalive sockets to be dropped on the
/// remote side, so every call opens a fresh connection.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
}

impl UpstreamClient {
    pub fn new() -> Self {
        let http = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .pool_max_idle_per_host(0)
            .build()
            .unwrap_or_default();
        Self { http }
    }

    /// GET `url`; `authorization` is sent verbatim when present.
    pub async fn get(
        &self,
        url: &str,
        authorization: Option<&str>,
    ) -> Result<HttpBody, UpstreamError> {
        let mut request = self.http.get(url);
        if let Some(authorization) = authorization {
            request = request.header(AUTHORIZATION, authorization);
        }
        Self::decode_response(request.send().await?).await
    }

    /// POST a JSON payload.
    pub async fn post_json(
        &self,
        url: &str,
        authorization: &str,
        payload: &Value,
    ) -> Result<HttpBody, UpstreamError> {
        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, authorization)
            .json(payload)
            .send()
            .await?;
        Self::decode_response(response).await
    }

    /// POST a multipart form.
    pub async fn post_multipart(
        &self,
        url: &str,
        authorization: &str,
        form: Form,
    ) -> Result<HttpBody, UpstreamError> {
        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, authorization)
            .multipart(form)
            .send()
            .await?;
        Self::decode_response(response).await
    }

    /// Read the body and decode it; only 200 counts as success, any other
    /// status becomes [`UpstreamError::Status`] carrying the decoded body.
    async fn decode_response(response: reqwest::Response) -> Result<HttpBody, UpstreamError> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        let data = response.bytes().await?;
        trace!(status, content_type, bytes = data.len(), "upstream response");

        let body = HttpBody::decode(&content_type, data);
        if status == 200 {
            Ok(body)
        } else {
            Err(UpstreamError::Status { code: status, body })
        }
    }
}

impl Default for UpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Multipart form for the image-variation endpoint.
///
/// Field order is the order the endpoint expects; `image` must carry PNG
/// data.
pub fn variation_form(
    count: i64,
    size: &str,
    image: reqwest::Body,
) -> Result<Form, UpstreamError> {
    let image = Part::stream(image)
        .file_name("image")
        .mime_str("image/png")
        .map_err(UpstreamError::Transport)?;

    Ok(Form::new()
        .text("n", count.to_string())
        .text("size", size.to_owned())
        .text("response_format", "url")
        // One user per API key, so any stable ID will do.
        .text("user", "1")
        .part("image", image))
}

/// JSON payload for the task-submission endpoint.
pub fn task_payload(batch_size: i64, image_png: &[u8]) -> Value {
    json!({
        "task_type": "variations",
        "prompt": {
            "batch_size": batch_size,
            "image": STANDARD.encode(image_png),
        },
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
