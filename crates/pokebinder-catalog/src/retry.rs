//! Bounded retry for catalog fetches.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, non-2xx responses). The wait between
//! attempts comes from a [`Backoff`] strategy carried by the [`RetryPolicy`],
//! so production runs can use the upstream-friendly fixed delay while tests
//! run with zero delay.

use std::future::Future;
use std::time::Duration;

use pokebinder_core::{AppConfig, RetryBackoff};

use crate::error::CatalogError;

/// Delay strategy between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// The same delay before every retry.
    Fixed(Duration),
    /// `base * 2^(attempt-1)` capped at `max`, scaled by ±25 % jitter.
    Exponential { base: Duration, max: Duration },
}

impl Backoff {
    /// Delay to sleep before retry number `attempt` (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { base, max } => {
                let factor = 1u32 << attempt.saturating_sub(1).min(16);
                let capped = base.saturating_mul(factor).min(max);
                capped.mul_f64(rand::random::<f64>() * 0.5 + 0.75)
            }
        }
    }
}

/// How many times to retry a transient failure, and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first; `3` means at most 4 requests.
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Fixed-delay policy: `max_retries` retries, `delay_ms` between each.
    #[must_use]
    pub fn fixed(max_retries: u32, delay_ms: u64) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed(Duration::from_millis(delay_ms)),
        }
    }

    /// Exponential policy: `max_retries` retries starting at `base_ms`,
    /// doubling each time up to `max_ms`, with jitter.
    #[must_use]
    pub fn exponential(max_retries: u32, base_ms: u64, max_ms: u64) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Exponential {
                base: Duration::from_millis(base_ms),
                max: Duration::from_millis(max_ms),
            },
        }
    }

    /// Policy selected by `POKEBINDER_RETRY_BACKOFF` and the retry settings.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        match config.retry_backoff {
            RetryBackoff::Fixed => Self::fixed(config.max_retries, config.retry_delay_ms),
            RetryBackoff::Exponential => Self::exponential(
                config.max_retries,
                config.retry_delay_ms,
                config.retry_max_delay_ms,
            ),
        }
    }

    /// No retries at all.
    #[must_use]
    pub fn none() -> Self {
        Self::fixed(0, 0)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(3, 1_000)
    }
}

/// Returns `true` for errors that are worth retrying after a delay.
///
/// Network failures and every non-2xx status are retried. A body that does
/// not parse, or a URL that cannot be built, will fail the same way again.
pub(crate) fn is_retriable(err: &CatalogError) -> bool {
    match err {
        CatalogError::Http(_) | CatalogError::UnexpectedStatus { .. } => true,
        CatalogError::Deserialize { .. } | CatalogError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation`, retrying transient errors up to `policy.max_retries` times.
///
/// On exhaustion the last error is returned; non-retriable errors are
/// returned immediately without sleeping.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay = policy.backoff.delay_for(attempt);
                #[allow(clippy::cast_possible_truncation)]
                let delay_ms = delay.as_millis() as u64;
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms,
                    error = %err,
                    "catalog fetch failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
