//! Collaborator-side retry with exponential backoff.
//!
//! Upstream fetchers wrap their calls in a [`RetryPolicy`] so the decision
//! engine only ever sees a typed outcome: data, or an explicit absence after
//! retries are exhausted. Nothing in the core path sleeps or raises.

use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Run `op` until it yields a value or attempts are exhausted, doubling
    /// the delay between attempts. Degrades to `None`, never raises.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        for attempt in 1..=self.max_attempts {
            if let Some(value) = op().await {
                return Some(value);
            }
            if attempt < self.max_attempts {
                let delay = self.base_delay * 2u32.saturating_pow(attempt - 1);
                tracing::warn!(
                    label,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Fetch attempt failed; backing off"
                );
                tokio::time::sleep(delay).await;
            }
        }
        tracing::warn!(
            label,
            attempts = self.max_attempts,
            "Retries exhausted; data unavailable"
        );
        None
    }
}
