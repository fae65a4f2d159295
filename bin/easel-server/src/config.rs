//! Server configuration, loaded from environment variables at startup.

use std::path::PathBuf;
use std::str::FromStr;

/// Which remote image API the proxy talks to.
///
/// The two integrations share one handler contract; the mode only decides
/// the submit endpoint, its payload shape, and the default bearer prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamMode {
    /// Multipart upload to the image-variations endpoint (`sk-` keys).
    Images,
    /// JSON task submission to the labs endpoint (`sess-` session tokens).
    Labs,
}

impl UpstreamMode {
    /// Bearer-token prefix expected when `EASEL_BEARER_PREFIX` is unset.
    pub fn default_bearer_prefix(self) -> &'static str {
        match self {
            UpstreamMode::Images => "sk-",
            UpstreamMode::Labs => "sess-",
        }
    }
}

impl FromStr for UpstreamMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "images" => Ok(UpstreamMode::Images),
            "labs" => Ok(UpstreamMode::Labs),
            other => Err(format!("unknown upstream mode: {other}")),
        }
    }
}

/// Which gateway serves the proxy endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayKind {
    /// Talk to the real remote services.
    Live,
    /// Serve canned task JSON and fixture images; no network, no converter.
    Mock,
}

impl FromStr for GatewayKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "live" => Ok(GatewayKind::Live),
            "mock" | "dummy" => Ok(GatewayKind::Mock),
            other => Err(format!("unknown gateway kind: {other}")),
        }
    }
}

/// Runtime configuration for easel-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated CORS origin allow-list; `None` means wildcard.
    pub cors_allowed_origins: Option<String>,

    /// Gateway selection (default: live).
    pub gateway: GatewayKind,

    /// Remote integration the live gateway targets (default: images).
    pub upstream_mode: UpstreamMode,

    /// Bearer-token prefix accepted after `"Bearer "`; defaults per mode.
    pub bearer_prefix: String,

    /// Image size used when the submit request does not carry one.
    pub default_size: String,

    /// Variation count used when the submit request does not carry one.
    pub default_count: i64,

    /// Upper bound on inbound image uploads, in bytes.
    pub max_upload_bytes: usize,

    /// ImageMagick `convert` executable (a path or a `$PATH` name).
    pub convert_bin: String,

    /// Overlay image composited onto downloaded results when set.
    pub watermark: Option<PathBuf>,

    /// Delay before the single poll retry, in milliseconds.
    pub poll_retry_delay_ms: u64,

    /// Directory holding `example-<n>.jpg` images for the mock gateway.
    pub fixture_dir: PathBuf,

    /// Serve `/api-docs/openapi.json` (default: true).
    pub enable_docs: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let upstream_mode: UpstreamMode = parse_env("EASEL_UPSTREAM_MODE", UpstreamMode::Images);
        Self {
            bind_address: env_or("EASEL_BIND", "0.0.0.0:3000"),
            log_level: env_or("EASEL_LOG", "info"),
            log_json: std::env::var("EASEL_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            cors_allowed_origins: std::env::var("EASEL_CORS_ORIGINS").ok(),
            gateway: parse_env("EASEL_GATEWAY", GatewayKind::Live),
            bearer_prefix: env_or("EASEL_BEARER_PREFIX", upstream_mode.default_bearer_prefix()),
            default_size: env_or("EASEL_DEFAULT_SIZE", "1024x1024"),
            default_count: parse_env("EASEL_DEFAULT_COUNT", 4),
            max_upload_bytes: parse_env("EASEL_MAX_UPLOAD_BYTES", 4 * 1024 * 1024),
            convert_bin: env_or("EASEL_CONVERT_BIN", "convert"),
            watermark: std::env::var("EASEL_WATERMARK").ok().map(PathBuf::from),
            poll_retry_delay_ms: parse_env("EASEL_POLL_RETRY_DELAY_MS", 1000),
            fixture_dir: PathBuf::from(env_or("EASEL_FIXTURE_DIR", "./fixtures")),
            enable_docs: std::env::var("EASEL_ENABLE_DOCS")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true),
            upstream_mode,
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn upstream_mode_parses_case_insensitively() {
        assert_eq!("images".parse(), Ok(UpstreamMode::Images));
        assert_eq!("Labs".parse(), Ok(UpstreamMode::Labs));
        assert!("dalle".parse::<UpstreamMode>().is_err());
    }

    #[test]
    fn bearer_prefix_defaults_follow_the_mode() {
        assert_eq!(UpstreamMode::Images.default_bearer_prefix(), "sk-");
        assert_eq!(UpstreamMode::Labs.default_bearer_prefix(), "sess-");
    }

    #[test]
    fn gateway_kind_accepts_the_dummy_alias() {
        assert_eq!("live".parse(), Ok(GatewayKind::Live));
        assert_eq!("mock".parse(), Ok(GatewayKind::Mock));
        assert_eq!("dummy".parse(), Ok(GatewayKind::Mock));
        assert!("fake".parse::<GatewayKind>().is_err());
    }
}
