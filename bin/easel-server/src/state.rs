//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::{Config, GatewayKind};
use crate::handlers::{AnyGateway, LiveGateway, MockGateway};

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// The gateway serving the proxy endpoints.
    pub gateway: Arc<AnyGateway>,
}

impl AppState {
    /// Assemble shared state, instantiating the configured gateway.
    pub fn from_config(cfg: Config) -> Self {
        let gateway = match cfg.gateway {
            GatewayKind::Live => AnyGateway::Live(LiveGateway::new(&cfg)),
            GatewayKind::Mock => AnyGateway::Mock(MockGateway::new(&cfg)),
        };
        Self {
            config: Arc::new(cfg),
            gateway: Arc::new(gateway),
        }
    }
}
