//! The live gateway: conversion pipeline + real remote services.

use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use easel_magick::{Converter, Profile};
use easel_upstream::{
    HttpBody, UpstreamClient, UpstreamError, endpoints, retry, task_payload, variation_form,
};
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::config::{Config, UpstreamMode};
use crate::error::ProxyError;
use crate::handlers::{ImageGateway, bearer_header, decode_image_body};
use crate::invocation::{FnResponse, Invocation};
use crate::validate;

/// Proxies requests to the real image services.
#[derive(Debug)]
pub struct LiveGateway {
    client: UpstreamClient,
    converter: Converter,
    mode: UpstreamMode,
    bearer_prefix: String,
    default_size: String,
    default_count: i64,
    watermark: Option<PathBuf>,
    poll_retry_delay: Duration,
}

impl LiveGateway {
    pub fn new(cfg: &Config) -> Self {
        Self {
            client: UpstreamClient::new(),
            converter: Converter::new(cfg.convert_bin.clone()),
            mode: cfg.upstream_mode,
            bearer_prefix: cfg.bearer_prefix.clone(),
            default_size: cfg.default_size.clone(),
            default_count: cfg.default_count,
            watermark: cfg.watermark.clone(),
            poll_retry_delay: Duration::from_millis(cfg.poll_retry_delay_ms),
        }
    }

    /// Multipart submission: the upload body streams straight out of the
    /// converter, so the network call and the pipeline run concurrently.
    async fn submit_variations(
        &self,
        url: &str,
        authorization: &str,
        size: &str,
        count: i64,
        input: Vec<u8>,
    ) -> Result<FnResponse, ProxyError> {
        let conversion = self.converter.spawn(&Profile::normalize(size))?;
        let (stdout, drive) = conversion.into_streaming(Bytes::from(input));

        let image = reqwest::Body::wrap_stream(ReaderStream::new(stdout));
        let form = variation_form(count, size, image).map_err(ProxyError::Upstream)?;
        let (uploaded, driven) =
            tokio::join!(self.client.post_multipart(url, authorization, form), drive);

        match uploaded {
            Ok(body) => {
                driven?;
                Ok(envelope(body))
            }
            // A definitive upstream verdict outranks whatever happened to
            // the converter; its error body may be worth passing through.
            Err(err @ UpstreamError::Status { .. }) => {
                passthrough(err).map(envelope).map_err(ProxyError::from)
            }
            Err(transport) => {
                driven?;
                Err(ProxyError::from(transport))
            }
        }
    }

    /// JSON task submission: the converted image travels base64-encoded
    /// inside the payload, so the pipeline runs to completion first.
    async fn submit_labs_task(
        &self,
        url: &str,
        authorization: &str,
        size: &str,
        count: i64,
        input: Vec<u8>,
    ) -> Result<FnResponse, ProxyError> {
        let png = self.converter.run(&Profile::normalize(size), &input).await?;
        let payload = task_payload(count, &png);
        match self.client.post_json(url, authorization, &payload).await {
            Ok(body) => Ok(envelope(body)),
            Err(err) => passthrough(err).map(envelope).map_err(ProxyError::from),
        }
    }

    async fn poll(&self, url: &str, authorization: &str) -> Result<FnResponse, ProxyError> {
        let body = retry(
            || self.client.get(url, Some(authorization)),
            1,
            self.poll_retry_delay,
        )
        .await?;
        Ok(envelope(body))
    }

    /// Download one stored image and run it through the converter, stamping
    /// the configured watermark on the way if there is one.
    async fn fetch_and_transcode(&self, url: &str) -> Result<FnResponse, ProxyError> {
        let body = self.client.get(url, None).await?;
        // Whatever came back goes into the pipeline; the converter is the
        // judge of whether it was an image.
        let input = match body {
            HttpBody::Bytes { data, .. } => data.to_vec(),
            HttpBody::Text(text) => text.into_bytes(),
            HttpBody::Json(value) => value.to_string().into_bytes(),
        };

        let profile = match &self.watermark {
            Some(overlay) => Profile::watermark(overlay),
            None => Profile::transcode(),
        };
        let jpeg = self.converter.run(&profile, &input).await?;
        Ok(FnResponse::jpeg(&jpeg))
    }
}

impl ImageGateway for LiveGateway {
    async fn submit_image(&self, invocation: &Invocation) -> Result<FnResponse, ProxyError> {
        if !invocation.is_base64_encoded {
            return Err(ProxyError::BadRequest(
                "request body must be base64-encoded".to_owned(),
            ));
        }
        let authorization = bearer_header(invocation, &self.bearer_prefix)?;
        let size = size_param(invocation, &self.default_size)?;
        let count = count_param(invocation, self.default_count)?;
        let input = decode_image_body(invocation)?;
        info!(mode = ?self.mode, size = %size, count, bytes = input.len(), "submitting image for variation generation");

        match self.mode {
            UpstreamMode::Images => {
                self.submit_variations(
                    endpoints::IMAGE_VARIATIONS_URL,
                    authorization,
                    &size,
                    count,
                    input,
                )
                .await
            }
            UpstreamMode::Labs => {
                self.submit_labs_task(endpoints::LABS_TASKS_URL, authorization, &size, count, input)
                    .await
            }
        }
    }

    async fn poll_task(&self, invocation: &Invocation) -> Result<FnResponse, ProxyError> {
        let authorization = bearer_header(invocation, &self.bearer_prefix)?;
        let task_id = invocation
            .path_parameters
            .get("taskID")
            .ok_or_else(|| ProxyError::BadRequest("missing taskID".to_owned()))?;
        if !validate::is_valid_task_id(task_id) {
            return Err(ProxyError::BadRequest("bad task ID".to_owned()));
        }
        debug!(task_id = %task_id, "polling task state");

        self.poll(&endpoints::task_url(task_id), authorization).await
    }

    async fn get_image(&self, invocation: &Invocation) -> Result<FnResponse, ProxyError> {
        let path = invocation
            .raw_path
            .strip_prefix("/getImage/")
            .filter(|rest| !rest.is_empty())
            .ok_or_else(|| ProxyError::BadRequest("bad request".to_owned()))?;
        let url = endpoints::blob_url(path, &invocation.raw_query_string);
        debug!(path = %path, "fetching generated image");

        self.fetch_and_transcode(&url).await
    }
}

// ── Parameter handling ─────────────────────────────────────────────────────────

/// `size` query parameter; absent or empty means the configured default.
fn size_param(invocation: &Invocation, default: &str) -> Result<String, ProxyError> {
    let size = invocation
        .query_string_parameters
        .get("size")
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(default);
    if !validate::is_valid_image_size(size) {
        return Err(ProxyError::BadRequest(format!("bad image size: {size}")));
    }
    Ok(size.to_owned())
}

/// `count` query parameter; absent, empty, non-numeric, or zero all mean the
/// configured default, and the result must land in the accepted range.
fn count_param(invocation: &Invocation, default: i64) -> Result<i64, ProxyError> {
    let count = invocation
        .query_string_parameters
        .get("count")
        .map(|raw| raw.parse::<i64>().unwrap_or(0))
        .map(|n| if n == 0 { default } else { n })
        .unwrap_or(default);
    if !validate::is_valid_image_count(count) {
        return Err(ProxyError::BadRequest(format!("bad image count: {count}")));
    }
    Ok(count)
}

/// Remote error bodies that carry an `error` field are forwarded to the
/// caller as a normal response, so the provider's own error semantics reach
/// the client unchanged.
fn passthrough(err: UpstreamError) -> Result<HttpBody, UpstreamError> {
    match err {
        UpstreamError::Status {
            body: HttpBody::Json(value),
            ..
        } if value.get("error").is_some() => Ok(HttpBody::Json(value)),
        other => Err(other),
    }
}

fn envelope(body: HttpBody) -> FnResponse {
    match body {
        HttpBody::Json(value) => FnResponse::json(&value),
        HttpBody::Bytes { content_type, data } => FnResponse::binary(&content_type, &data),
        HttpBody::Text(text) => FnResponse::text(text),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
