//! Request validators.
//!
//! Pure predicates, no I/O.  Handlers must reject a request before any
//! downstream work if one of these returns false.

/// Sizes the variation endpoints accept.
pub const ALLOWED_IMAGE_SIZES: [&str; 3] = ["256x256", "512x512", "1024x1024"];

/// Characters allowed inside bearer tokens and task IDs.
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'=' || b == b'-')
}

/// `Bearer <prefix><token-chars>`, with the deployment's configured prefix.
pub fn is_valid_bearer_header(header: &str, prefix: &str) -> bool {
    header
        .strip_prefix("Bearer ")
        .and_then(|token| token.strip_prefix(prefix))
        .is_some_and(is_token)
}

/// `task-<token-chars>`; used only as a URL path segment.
pub fn is_valid_task_id(id: &str) -> bool {
    id.strip_prefix("task-").is_some_and(is_token)
}

/// True only for the exact strings in [`ALLOWED_IMAGE_SIZES`].
pub fn is_valid_image_size(size: &str) -> bool {
    ALLOWED_IMAGE_SIZES.contains(&size)
}

/// Variation counts are integers in `[1, 10]`.
pub fn is_valid_image_count(count: i64) -> bool {
    (1..=10).contains(&count)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
