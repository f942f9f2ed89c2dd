//! Injectable delay between attempts.

use std::time::Duration;

use async_trait::async_trait;
use syrup_domain::constants::MAX_RETRY_BACKOFF_SHIFT;

/// Suspends the caller for a given duration.
///
/// Used both between transport retries and between job polls, so tests can
/// substitute a recording or no-op implementation.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real delays on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Delay before transport retry number `retry_number` (1-based):
/// `base * 2^(retry_number - 1)`, with the exponent capped.
pub fn exponential_backoff(base: Duration, retry_number: u32) -> Duration {
    let shift = retry_number.saturating_sub(1).min(MAX_RETRY_BACKOFF_SHIFT);
    base.saturating_mul(1u32 << shift)
}
