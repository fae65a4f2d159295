use crate::state::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Cross-origin policy for the proxy surface.
pub fn cors_layer(state: Arc<AppState>) -> CorsLayer {
    match &state.config.cors_allowed_origins {
        Some(list) => {
            let origins: Vec<axum::http::HeaderValue> = list
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                permissive()
            } else {
                CorsLayer::new()
                    .allow_origin(origins)
                    .allow_headers(Any)
                    .allow_methods(Any)
            }
        }
        // Wildcard – suitable for development; set EASEL_CORS_ORIGINS in
        // production.
        None => permissive(),
    }
}

fn permissive() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any)
}
