//! Fetch retry logic for transient provider failures
//!
//! Provides bounded retry with a randomized backoff picked from a fixed set of
//! delays, which keeps a batch from hammering a rate-limited provider in
//! lockstep.

use crate::error::FetchError;
use rand::seq::SliceRandom;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF_SECS: [u64; 3] = [21, 33, 42];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Candidate delays; one is picked at random before each retry.
    pub backoff: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF_SECS
                .iter()
                .map(|s| Duration::from_secs(*s))
                .collect(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Vec<Duration>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// No retries at all.
    pub fn none() -> Self {
        Self::new(1, Vec::new())
    }

    fn pick_backoff(&self) -> Duration {
        self.backoff
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}

/// Execute a fetch with retry on transient failures.
///
/// Non-transient errors (not played yet, in progress, schema mismatch) are
/// returned immediately.
///
/// # Example
/// ```ignore
/// let payload = fetch_with_retry(game_id, &policy, || source.play_by_play(game_id)).await?;
/// ```
pub async fn fetch_with_retry<F, Fut, T>(
    game_id: &str,
    policy: &RetryPolicy,
    mut f: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt < policy.max_attempts && e.is_transient() => {
                let backoff = policy.pick_backoff();
                warn!(
                    game_id,
                    attempt,
                    max_attempts = policy.max_attempts,
                    backoff_secs = backoff.as_secs_f64(),
                    error = %e,
                    "Fetch failed, retrying"
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(3, vec![Duration::ZERO])
    }

    fn transient() -> FetchError {
        FetchError::Transient {
            game_id: "g".into(),
            message: "connection reset".into(),
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert!(policy.backoff.contains(&policy.pick_backoff()));
        assert_eq!(RetryPolicy::none().pick_backoff(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_retry_succeeds_eventually() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();

        let result = fetch_with_retry("g", &fast_policy(), || {
            let count = attempt_count_clone.clone();
            async move {
                let current = count.fetch_add(1, Ordering::SeqCst) + 1;
                if current < 3 {
                    Err(transient())
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_fails_after_max_attempts() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();

        let result: Result<i32, FetchError> = fetch_with_retry("g", &fast_policy(), || {
            let count = attempt_count_clone.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Err(transient())
            }
        })
        .await;

        assert!(result.unwrap_err().is_transient());
        assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_retry_on_terminal_error() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let attempt_count_clone = attempt_count.clone();

        let result: Result<i32, FetchError> = fetch_with_retry("g", &fast_policy(), || {
            let count = attempt_count_clone.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::NotYetPlayed {
                    game_id: "g".into(),
                })
            }
        })
        .await;

        assert!(result.unwrap_err().is_terminal());
        assert_eq!(attempt_count.load(Ordering::SeqCst), 1);
    }
}
