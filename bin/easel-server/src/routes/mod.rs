//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Optional OpenAPI document endpoint (disable with `EASEL_ENABLE_DOCS=false`)
//! - Health / heartbeat route
//! - The three proxy routes

pub mod doc;
mod health;
mod proxy;

use axum::routing::get;
use axum::{Json, Router, middleware};

use crate::middleware::{cors, trace};
use crate::state::AppState;
use std::sync::Arc;
use tower::ServiceBuilder;

// ── Router builder ────────────────────────────────────────────────────────────

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .merge(proxy::router(&state));

    // ── OpenAPI document ──────────────────────────────────────────────────────
    // Enabled by default; disable with EASEL_ENABLE_DOCS=false in production
    // to avoid exposing the API structure to potential attackers.
    if state.config.enable_docs {
        app = app.route(
            "/api-docs/openapi.json",
            get(|| async { Json(doc::get_docs()) }),
        );
    }

    app
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(state.clone())))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}
