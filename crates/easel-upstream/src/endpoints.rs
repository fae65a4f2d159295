//! Fixed remote endpoints.
//!
//! Every remote host is a compile-time constant.  [`blob_url`] in
//! particular concatenates the trusted blob-store base with the
//! caller-supplied path suffix and query string, so a caller can pick which
//! stored image to fetch but can never point the proxy at another host.

/// Multipart image-variation endpoint.
pub const IMAGE_VARIATIONS_URL: &str = "https://api.openai.com/v1/images/variations";

/// JSON task-submission endpoint.
pub const LABS_TASKS_URL: &str = "https://labs.openai.com/api/labs/tasks";

/// Blob store serving generated images.
pub const BLOB_STORE_BASE: &str = "https://oaidalleapiprodscus.blob.core.windows.net/";

/// Status URL for one submitted task.
pub fn task_url(task_id: &str) -> String {
    format!("{LABS_TASKS_URL}/{task_id}")
}

/// Blob URL for a stored image.
///
/// `path` is the caller-supplied suffix (no leading slash) and `query` the
/// verbatim query string carrying the store's access signature.
pub fn blob_url(path: &str, query: &str) -> String {
    if query.is_empty() {
        format!("{BLOB_STORE_BASE}{path}")
    } else {
        format!("{BLOB_STORE_BASE}{path}?{query}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_url_appends_the_id() {
        assert_eq!(
            task_url("task-abc123"),
            "https://labs.openai.com/api/labs/tasks/task-abc123"
        );
    }

    #[test]
    fn blob_url_pins_the_trusted_host() {
        assert_eq!(
            blob_url("abc/def", "x=1"),
            "https://oaidalleapiprodscus.blob.core.windows.net/abc/def?x=1"
        );
    }

    #[test]
    fn blob_url_omits_the_separator_without_a_query() {
        assert_eq!(
            blob_url("private/image.webp", ""),
            "https://oaidalleapiprodscus.blob.core.windows.net/private/image.webp"
        );
    }

    #[test]
    fn blob_url_keeps_hostile_suffixes_on_the_trusted_host() {
        // A suffix dressed up as an absolute URL is still just a path.
        let url = blob_url("evil.example.com/steal", "");
        assert!(url.starts_with(BLOB_STORE_BASE));

        let url = blob_url("/..//evil.example.com", "q=1");
        assert!(url.starts_with(BLOB_STORE_BASE));
    }
}
