//! Response payloads decoded by declared content type.

use bytes::Bytes;
use serde_json::Value;
use tracing::warn;

/// A response body decoded according to the `Content-Type` the remote
/// service declared.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpBody {
    /// `application/json`, parsed.
    Json(Value),
    /// An image payload, untouched.
    Bytes { content_type: String, data: Bytes },
    /// Anything else, taken as UTF-8 text.
    Text(String),
}

/// Image content types that are kept as raw bytes instead of being read as
/// text.
const RAW_IMAGE_TYPES: [&str; 3] = ["image/webp", "image/jpeg", "image/png"];

impl HttpBody {
    /// Decode `data` per the declared `content_type` (parameters such as
    /// `; charset=utf-8` are ignored).
    ///
    /// A declared-JSON body that fails to parse degrades to
    /// [`HttpBody::Text`] so a wrongly tagged upstream response still reaches
    /// the caller verbatim instead of aborting the exchange.
    pub fn decode(content_type: &str, data: Bytes) -> HttpBody {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence == "application/json" {
            match serde_json::from_slice(&data) {
                Ok(value) => HttpBody::Json(value),
                Err(error) => {
                    warn!(%content_type, %error, "declared-JSON body failed to parse, keeping it as text");
                    HttpBody::Text(String::from_utf8_lossy(&data).into_owned())
                }
            }
        } else if RAW_IMAGE_TYPES.contains(&essence.as_str()) {
            HttpBody::Bytes {
                content_type: essence,
                data,
            }
        } else {
            HttpBody::Text(String::from_utf8_lossy(&data).into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_content_is_parsed() {
        let body = HttpBody::decode("application/json", Bytes::from_static(b"{\"ok\":true}"));
        assert_eq!(body, HttpBody::Json(json!({"ok": true})));
    }

    #[test]
    fn media_type_parameters_are_ignored() {
        let body = HttpBody::decode(
            "application/json; charset=utf-8",
            Bytes::from_static(b"[1,2]"),
        );
        assert_eq!(body, HttpBody::Json(json!([1, 2])));
    }

    #[test]
    fn unparseable_json_degrades_to_text() {
        let body = HttpBody::decode("application/json", Bytes::from_static(b"not json"));
        assert_eq!(body, HttpBody::Text("not json".to_string()));
    }

    #[test]
    fn image_content_stays_raw() {
        for content_type in ["image/webp", "image/jpeg", "image/png"] {
            let data = Bytes::from_static(&[0xff, 0xd8, 0x00]);
            let body = HttpBody::decode(content_type, data.clone());
            assert_eq!(
                body,
                HttpBody::Bytes {
                    content_type: content_type.to_string(),
                    data,
                }
            );
        }
    }

    #[test]
    fn unrecognized_content_becomes_text() {
        // Only the known image types bypass text decoding; everything else,
        // octet-stream included, is read as UTF-8.
        let body = HttpBody::decode("application/octet-stream", Bytes::from_static(b"blob"));
        assert_eq!(body, HttpBody::Text("blob".to_string()));
    }
}
