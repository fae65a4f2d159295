//! The function-invocation envelope carried between the HTTP layer and the
//! request handlers.
//!
//! [`Invocation`] flattens one inbound request into headers, parameters, and
//! an optionally base64-encoded body; [`FnResponse`] is the matching
//! `{headers, statusCode, body, isBase64Encoded}` outbound shape.  The camel
//! case wire names are part of the envelope contract and are kept verbatim.

use std::collections::HashMap;

use axum::body::Body;
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::error;

/// One proxied request, flattened out of the HTTP layer.
///
/// Header names are lowercase; `body` holds base64 text whenever
/// `is_base64_encoded` is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub path_parameters: HashMap<String, String>,
    #[serde(default)]
    pub query_string_parameters: HashMap<String, String>,
    pub raw_path: String,
    #[serde(default)]
    pub raw_query_string: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

/// Handler response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FnResponse {
    pub headers: HashMap<String, String>,
    pub status_code: u16,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl FnResponse {
    /// A 200 response carrying a JSON document.
    pub fn json(value: &Value) -> Self {
        Self {
            headers: content_type("application/json"),
            status_code: 200,
            body: value.to_string(),
            is_base64_encoded: false,
        }
    }

    /// A 200 response carrying plain text.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            headers: content_type("text/plain; charset=utf-8"),
            status_code: 200,
            body: body.into(),
            is_base64_encoded: false,
        }
    }

    /// A 200 response carrying binary data, base64-encoded in transit.
    pub fn binary(media_type: &str, data: &[u8]) -> Self {
        Self {
            headers: content_type(media_type),
            status_code: 200,
            body: STANDARD.encode(data),
            is_base64_encoded: true,
        }
    }

    /// The image-handler response shape: a base64 JPEG payload.
    pub fn jpeg(data: &[u8]) -> Self {
        Self::binary("image/jpeg", data)
    }
}

fn content_type(value: &str) -> HashMap<String, String> {
    HashMap::from([("Content-Type".to_string(), value.to_string())])
}

impl IntoResponse for FnResponse {
    fn into_response(self) -> Response {
        let payload = if self.is_base64_encoded {
            match STANDARD.decode(&self.body) {
                Ok(bytes) => Body::from(bytes),
                Err(err) => {
                    error!(error = %err, "function response flagged as base64 but failed to decode");
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": "internal server error" })),
                    )
                        .into_response();
                }
            }
        } else {
            Body::from(self.body)
        };

        let mut response = Response::new(payload);
        *response.status_mut() =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                response.headers_mut().insert(name, value);
            }
        }
        response
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn envelope_serializes_with_camel_case_keys() {
        let value = serde_json::to_value(FnResponse::jpeg(b"jpegdata")).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["isBase64Encoded"], true);
        assert_eq!(value["headers"]["Content-Type"], "image/jpeg");
        assert_eq!(value["body"], STANDARD.encode(b"jpegdata"));
    }

    #[test]
    fn invocation_deserializes_a_hosted_event() {
        let event = json!({
            "headers": {"x-authorization": "Bearer sess-abc"},
            "pathParameters": {"taskID": "task-abc"},
            "rawPath": "/pollTask/task-abc",
            "rawQueryString": "",
            "isBase64Encoded": false,
        });
        let invocation: Invocation = serde_json::from_value(event).unwrap();
        assert_eq!(
            invocation.headers.get("x-authorization").map(String::as_str),
            Some("Bearer sess-abc")
        );
        assert_eq!(
            invocation.path_parameters.get("taskID").map(String::as_str),
            Some("task-abc")
        );
        assert!(!invocation.is_base64_encoded);
        assert!(invocation.body.is_empty());
    }

    #[test]
    fn json_responses_are_not_base64_flagged() {
        let response = FnResponse::json(&json!({"status": "pending"}));
        assert_eq!(response.status_code, 200);
        assert!(!response.is_base64_encoded);
        assert_eq!(response.body, "{\"status\":\"pending\"}");
    }

    #[tokio::test]
    async fn base64_bodies_are_decoded_into_the_http_response() {
        let response = FnResponse::jpeg(b"raw jpeg bytes").into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "image/jpeg"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"raw jpeg bytes");
    }

    #[tokio::test]
    async fn corrupt_base64_degrades_to_an_internal_error() {
        let response = FnResponse {
            headers: HashMap::new(),
            status_code: 200,
            body: "%%%not-base64%%%".to_string(),
            is_base64_encoded: true,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
