//! Image-gateway abstraction.
//!
//! [`ImageGateway`] defines the contract the proxy routes program against.
//! [`live::LiveGateway`] talks to the real remote services; [`mock::MockGateway`]
//! serves canned task JSON and fixture images for offline development.  Both
//! are selected by configuration and dispatched through [`AnyGateway`].
//!
//! Trait methods use `impl Future` in their signatures (stable since Rust
//! 1.75) so no extra `async-trait` crate is required.

pub mod live;
pub mod mock;

pub use live::LiveGateway;
pub use mock::MockGateway;

use std::future::Future;

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::ProxyError;
use crate::invocation::{FnResponse, Invocation};
use crate::validate;

/// The three proxy operations, independent of which backend serves them.
pub trait ImageGateway: Send + Sync + 'static {
    /// Normalize the uploaded image and submit it for variation generation.
    fn submit_image(
        &self,
        invocation: &Invocation,
    ) -> impl Future<Output = Result<FnResponse, ProxyError>> + Send;

    /// Fetch the current state of a submitted generation task.
    fn poll_task(
        &self,
        invocation: &Invocation,
    ) -> impl Future<Output = Result<FnResponse, ProxyError>> + Send;

    /// Fetch one generated image and return it as a JPEG payload.
    fn get_image(
        &self,
        invocation: &Invocation,
    ) -> impl Future<Output = Result<FnResponse, ProxyError>> + Send;
}

/// Configuration-selected gateway.
#[derive(Debug)]
pub enum AnyGateway {
    Live(LiveGateway),
    Mock(MockGateway),
}

impl ImageGateway for AnyGateway {
    async fn submit_image(&self, invocation: &Invocation) -> Result<FnResponse, ProxyError> {
        match self {
            AnyGateway::Live(gateway) => gateway.submit_image(invocation).await,
            AnyGateway::Mock(gateway) => gateway.submit_image(invocation).await,
        }
    }

    async fn poll_task(&self, invocation: &Invocation) -> Result<FnResponse, ProxyError> {
        match self {
            AnyGateway::Live(gateway) => gateway.poll_task(invocation).await,
            AnyGateway::Mock(gateway) => gateway.poll_task(invocation).await,
        }
    }

    async fn get_image(&self, invocation: &Invocation) -> Result<FnResponse, ProxyError> {
        match self {
            AnyGateway::Live(gateway) => gateway.get_image(invocation).await,
            AnyGateway::Mock(gateway) => gateway.get_image(invocation).await,
        }
    }
}

// ── Shared request plumbing ────────────────────────────────────────────────────

/// The verbatim `x-authorization` value, validated against the configured
/// bearer prefix.
pub(crate) fn bearer_header<'a>(
    invocation: &'a Invocation,
    prefix: &str,
) -> Result<&'a str, ProxyError> {
    let header = invocation
        .headers
        .get("x-authorization")
        .ok_or_else(|| ProxyError::BadRequest("missing x-authorization header".to_owned()))?;
    if !validate::is_valid_bearer_header(header, prefix) {
        return Err(ProxyError::Unauthorized("bad bearer token".to_owned()));
    }
    Ok(header)
}

/// Decode the base64 request body into raw image bytes.
pub(crate) fn decode_image_body(invocation: &Invocation) -> Result<Vec<u8>, ProxyError> {
    if !invocation.is_base64_encoded {
        return Err(ProxyError::BadRequest(
            "request body must be base64-encoded".to_owned(),
        ));
    }
    STANDARD
        .decode(invocation.body.as_bytes())
        .map_err(|e| ProxyError::BadRequest(format!("invalid base64 body: {e}")))
}

#[cfg(test)]
mod test {
    use super::*;

    fn with_bearer(value: &str) -> Invocation {
        let mut invocation = Invocation::default();
        invocation
            .headers
            .insert("x-authorization".to_owned(), value.to_owned());
        invocation
    }

    #[test]
    fn missing_authorization_is_a_bad_request() {
        let err = bearer_header(&Invocation::default(), "sess-").unwrap_err();
        assert!(matches!(err, ProxyError::BadRequest(_)));
    }

    #[test]
    fn malformed_authorization_is_unauthorized() {
        let err = bearer_header(&with_bearer("Bearer sk-abc"), "sess-").unwrap_err();
        assert!(matches!(err, ProxyError::Unauthorized(_)));
    }

    #[test]
    fn valid_authorization_passes_through_verbatim() {
        let invocation = with_bearer("Bearer sess-abc_123=");
        let header = bearer_header(&invocation, "sess-").unwrap();
        assert_eq!(header, "Bearer sess-abc_123=");
    }

    #[test]
    fn unflagged_bodies_are_rejected() {
        let mut invocation = Invocation::default();
        invocation.body = STANDARD.encode(b"jpeg");
        let err = decode_image_body(&invocation).unwrap_err();
        assert!(matches!(err, ProxyError::BadRequest(_)));
    }

    #[test]
    fn flagged_bodies_decode_to_raw_bytes() {
        let mut invocation = Invocation::default();
        invocation.body = STANDARD.encode(b"jpeg bytes");
        invocation.is_base64_encoded = true;
        assert_eq!(decode_image_body(&invocation).unwrap(), b"jpeg bytes");
    }
}
