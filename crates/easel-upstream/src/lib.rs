pub mod body;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod retry;

pub use body::HttpBody;
pub use client::{BROWSER_USER_AGENT, UpstreamClient, task_payload, variation_form};
pub use error::UpstreamError;
pub use retry::retry;
