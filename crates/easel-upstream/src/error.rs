use thiserror::Error;

use crate::body::HttpBody;

/// Errors returned by calls against the remote image services.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The remote endpoint answered with a status other than 200 OK.
    ///
    /// The decoded body is preserved so callers can inspect, and selectively
    /// forward, whatever the service had to say about the failure.
    #[error("upstream returned HTTP {code}")]
    Status { code: u16, body: HttpBody },

    /// The exchange never produced a usable response (connect, TLS, or
    /// body-read failure).
    #[error("upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
