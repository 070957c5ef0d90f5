use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::consts::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BASE_DELAY_MS};
use crate::error::{CanopyError, Result};
use crate::scene::{SceneCollection, SceneQuery};

use super::{CancelToken, SceneSource};

/// Exponential backoff for `SourceUnavailable` failures.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    #[serde(default = "default_attempts")]
    pub attempts: usize,
    /// Delay before the first retry; doubled after each.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_attempts() -> usize {
    DEFAULT_RETRY_ATTEMPTS
}
fn default_base_delay_ms() -> u64 {
    DEFAULT_RETRY_BASE_DELAY_MS
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_RETRY_ATTEMPTS,
            base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    pub fn delay(&self, retry: usize) -> Duration {
        let factor = 1u64 << retry.min(16);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

/// Retries an inner source while it reports `SourceUnavailable`.
/// Every other error, including `Cancelled`, is returned immediately.
pub struct RetryingSource<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: SceneSource> RetryingSource<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<S: SceneSource> SceneSource for RetryingSource<S> {
    fn query(&self, query: &SceneQuery, cancel: &CancelToken) -> Result<SceneCollection> {
        let mut retry = 0;
        loop {
            match self.inner.query(query, cancel) {
                Err(CanopyError::SourceUnavailable(msg)) if retry < self.policy.attempts => {
                    let delay = self.policy.delay(retry);
                    warn!(
                        source = self.inner.name(),
                        retry = retry + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %msg,
                        "Scene source unavailable, retrying"
                    );
                    std::thread::sleep(delay);
                    cancel.check()?;
                    retry += 1;
                }
                other => return other,
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
