//! Request tracing: one span per request, correlated by `x-trace-id`.
//!
//! Bodies are never buffered here; image uploads and downloads run to
//! multiple megabytes and must stream through untouched.

use axum::{
    body::Body,
    extract::Request,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

pub static X_TRACE_ID: &str = "x-trace-id";

pub async fn trace_middleware(mut req: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();

    // Reuse the caller's trace ID when it is a well-formed UUID, otherwise
    // mint a fresh one.
    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %method,
        path = %path,
    );

    async move {
        info!("→ request started");

        req.headers_mut()
            .insert(X_TRACE_ID, trace_id.to_string().parse().unwrap());

        let mut response = next.run(req).await;

        let latency = start_time.elapsed();
        response
            .headers_mut()
            .insert(X_TRACE_ID, trace_id.to_string().parse().unwrap());

        info!(
            status = response.status().as_u16(),
            latency_ms = latency.as_millis(),
            "← response finished"
        );

        response
    }
    .instrument(span)
    .await
}
