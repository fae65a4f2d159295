//! Fixed-delay retry for flaky upstream calls.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Run `op` up to `max_retries + 1` times, sleeping `delay` between
/// attempts.
///
/// The first success wins; once every attempt has failed, the last error is
/// returned unchanged.  The delay is fixed — no jitter, no exponential
/// growth: the task endpoint either answers on a prompt second try or is
/// down for longer than a request is worth waiting.
pub async fn retry<T, E, F, Fut>(mut op: F, max_retries: u32, delay: Duration) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < max_retries => {
                attempt += 1;
                warn!(attempt, %error, "upstream call failed, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(error) => return Err(error),
        }
    }
}
