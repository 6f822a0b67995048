//! Bounded retry for optimistic write conflicts.
//!
//! SurrealDB aborts one of two transactions that write the same keys
//! and reports the loser as retryable. Writers that touch a shared
//! record (the user ID counter, a user's reset token) go through
//! [`on_conflict`] so the conflict never reaches the caller.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::error::DbError;

pub(crate) const MAX_ATTEMPTS: u32 = 32;

/// Run `op` until it succeeds, fails for a reason other than a write
/// conflict, or [`MAX_ATTEMPTS`] is reached.
pub(crate) async fn on_conflict<T, F, Fut>(entity: &str, mut op: F) -> Result<T, DbError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Err(e) if e.is_write_conflict() && attempt < MAX_ATTEMPTS => {
                debug!(entity, attempt, "Write conflict, retrying");
                tokio::time::sleep(backoff(attempt)).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

/// Full jitter, capped at 64 ms.
fn backoff(attempt: u32) -> Duration {
    let cap_ms = 1u64 << attempt.min(6);
    Duration::from_millis(rand::rng().random_range(0..=cap_ms))
}
