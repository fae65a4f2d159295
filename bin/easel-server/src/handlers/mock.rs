//! The mock gateway: canned task fixtures and local images, no remote calls.
//!
//! Useful for local development and load testing without burning provider
//! credits.  Selected with `EASEL_GATEWAY=mock`.

use std::path::PathBuf;

use chrono::Utc;
use easel_upstream::endpoints;
use serde_json::{Value, json};
use tracing::info;

use crate::config::Config;
use crate::error::ProxyError;
use crate::handlers::{ImageGateway, bearer_header, decode_image_body};
use crate::invocation::{FnResponse, Invocation};
use crate::validate;

/// Path-segment marker the provider uses for generation blobs.  The digits
/// right after it select which canned fixture image is served.
const FIXTURE_MARKER: &str = "generation-abcdefghijklmnopqrstuvw";

/// Serves fixture responses shaped like the real task API.
#[derive(Debug)]
pub struct MockGateway {
    bearer_prefix: String,
    fixture_dir: PathBuf,
    /// Chance that a poll reports the task as finished.
    completion_probability: f64,
}

impl MockGateway {
    pub fn new(cfg: &Config) -> Self {
        Self {
            bearer_prefix: cfg.bearer_prefix.clone(),
            fixture_dir: cfg.fixture_dir.clone(),
            completion_probability: 0.5,
        }
    }
}

impl ImageGateway for MockGateway {
    async fn submit_image(&self, invocation: &Invocation) -> Result<FnResponse, ProxyError> {
        if !invocation.is_base64_encoded {
            return Err(ProxyError::BadRequest(
                "request body must be base64-encoded".to_owned(),
            ));
        }
        bearer_header(invocation, &self.bearer_prefix)?;
        let input = decode_image_body(invocation)?;
        info!(bytes = input.len(), "ignoring uploaded image");

        Ok(FnResponse::json(&pending_task()))
    }

    async fn poll_task(&self, invocation: &Invocation) -> Result<FnResponse, ProxyError> {
        bearer_header(invocation, &self.bearer_prefix)?;
        let task_id = invocation
            .path_parameters
            .get("taskID")
            .ok_or_else(|| ProxyError::BadRequest("missing taskID".to_owned()))?;
        if !validate::is_valid_task_id(task_id) {
            return Err(ProxyError::BadRequest("bad task ID".to_owned()));
        }

        if rand::random::<f64>() < self.completion_probability {
            Ok(FnResponse::json(&complete_task()))
        } else {
            Ok(FnResponse::json(&pending_task()))
        }
    }

    async fn get_image(&self, invocation: &Invocation) -> Result<FnResponse, ProxyError> {
        let path = invocation
            .path_parameters
            .get("imagePath")
            .ok_or_else(|| ProxyError::BadRequest("missing imagePath".to_owned()))?;
        let index = fixture_index(path)
            .ok_or_else(|| ProxyError::BadRequest("unrecognized image path".to_owned()))?;

        let file = self.fixture_dir.join(format!("example-{index}.jpg"));
        let jpeg = tokio::fs::read(&file).await?;
        Ok(FnResponse::jpeg(&jpeg))
    }
}

/// The numeric suffix of the `generation-…` path segment, if present.
fn fixture_index(path: &str) -> Option<u32> {
    let rest = &path[path.find(FIXTURE_MARKER)? + FIXTURE_MARKER.len()..];
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

// ── Fixtures ───────────────────────────────────────────────────────────────────

fn pending_task() -> Value {
    json!({
        "object": "task",
        "id": "task-tesTK1WhZJyUeCVMdXvL77Bk",
        "created": Utc::now().timestamp(),
        "task_type": "variations",
        "status": "pending",
        "status_information": {},
    })
}

fn complete_task() -> Value {
    let created = Utc::now().timestamp();
    let generations: Vec<Value> = (1..=2)
        .map(|i| {
            json!({
                "id": format!("{FIXTURE_MARKER}{i}"),
                "object": "generation",
                "created": created,
                "generation_type": "image_generation",
                "generation": {
                    "image_path": format!(
                        "{}private/org-easel/user-easel/{FIXTURE_MARKER}{i}/image.webp",
                        endpoints::BLOB_STORE_BASE
                    ),
                },
            })
        })
        .collect();

    json!({
        "object": "task",
        "id": "task-tesTK1WhZJyUeCVMdXvL77Bk",
        "created": created,
        "task_type": "variations",
        "status": "succeeded",
        "status_information": {},
        "generations": {
            "object": "list",
            "data": generations,
        },
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use tracing_test::traced_test;

    fn gateway(completion_probability: f64) -> MockGateway {
        MockGateway {
            bearer_prefix: "sess-".to_owned(),
            fixture_dir: PathBuf::from("/nonexistent"),
            completion_probability,
        }
    }

    fn submit_invocation() -> Invocation {
        let mut invocation = Invocation::default();
        invocation
            .headers
            .insert("x-authorization".to_owned(), "Bearer sess-abc".to_owned());
        invocation.raw_path = "/submitImage".to_owned();
        invocation.body = STANDARD.encode(b"discarded image bytes");
        invocation.is_base64_encoded = true;
        invocation
    }

    fn poll_invocation(task_id: &str) -> Invocation {
        let mut invocation = Invocation::default();
        invocation
            .headers
            .insert("x-authorization".to_owned(), "Bearer sess-abc".to_owned());
        invocation
            .path_parameters
            .insert("taskID".to_owned(), task_id.to_owned());
        invocation
    }

    #[traced_test]
    #[tokio::test]
    async fn submit_discards_the_upload_and_returns_a_pending_task() {
        let response = gateway(0.5)
            .submit_image(&submit_invocation())
            .await
            .unwrap();

        assert_eq!(response.status_code, 200);
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["status"], "pending");
        assert_eq!(body["task_type"], "variations");
        assert!(logs_contain("ignoring uploaded image"));
    }

    #[tokio::test]
    async fn submit_still_validates_the_bearer() {
        let mut invocation = submit_invocation();
        invocation
            .headers
            .insert("x-authorization".to_owned(), "Bearer sk-abc".to_owned());

        let err = gateway(0.5).submit_image(&invocation).await.unwrap_err();
        assert!(matches!(err, ProxyError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn poll_outcome_follows_the_completion_probability() {
        let invocation = poll_invocation("task-abc");

        let done = gateway(1.0).poll_task(&invocation).await.unwrap();
        let body: Value = serde_json::from_str(&done.body).unwrap();
        assert_eq!(body["status"], "succeeded");
        let image_path = body["generations"]["data"][0]["generation"]["image_path"]
            .as_str()
            .unwrap();
        assert!(image_path.starts_with(endpoints::BLOB_STORE_BASE));
        assert!(image_path.contains(FIXTURE_MARKER));

        let waiting = gateway(0.0).poll_task(&invocation).await.unwrap();
        let body: Value = serde_json::from_str(&waiting.body).unwrap();
        assert_eq!(body["status"], "pending");
    }

    #[tokio::test]
    async fn poll_rejects_malformed_task_ids() {
        let err = gateway(0.5)
            .poll_task(&poll_invocation("nottask-abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::BadRequest(_)));
    }

    #[tokio::test]
    async fn get_image_serves_the_indexed_fixture() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("example-2.jpg"), b"jpegbytes").unwrap();
        let gateway = MockGateway {
            bearer_prefix: "sess-".to_owned(),
            fixture_dir: dir.path().to_path_buf(),
            completion_probability: 0.5,
        };

        let mut invocation = Invocation::default();
        invocation.path_parameters.insert(
            "imagePath".to_owned(),
            format!("private/org-easel/{FIXTURE_MARKER}2/image.webp"),
        );

        let response = gateway.get_image(&invocation).await.unwrap();
        assert_eq!(response.status_code, 200);
        assert!(response.is_base64_encoded);
        assert_eq!(
            response.headers.get("Content-Type").map(String::as_str),
            Some("image/jpeg")
        );
        assert_eq!(
            STANDARD.decode(&response.body).unwrap(),
            b"jpegbytes".to_vec()
        );
    }

    #[tokio::test]
    async fn get_image_rejects_paths_without_the_marker() {
        let mut invocation = Invocation::default();
        invocation
            .path_parameters
            .insert("imagePath".to_owned(), "private/whatever.webp".to_owned());

        let err = gateway(0.5).get_image(&invocation).await.unwrap_err();
        assert!(matches!(err, ProxyError::BadRequest(_)));
    }

    #[test]
    fn fixture_index_reads_digits_after_the_marker() {
        assert_eq!(
            fixture_index(&format!("a/{FIXTURE_MARKER}17/image.webp")),
            Some(17)
        );
        assert_eq!(fixture_index(&format!("{FIXTURE_MARKER}3")), Some(3));
        assert_eq!(fixture_index(FIXTURE_MARKER), None);
        assert_eq!(fixture_index("no-marker-here"), None);
    }
}
