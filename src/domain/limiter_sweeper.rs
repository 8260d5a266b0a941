//! Background task retiring idle rate-limit keys.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};

use crate::domain::rate_limiter::SlidingWindowLimiter;

/// Periodically sweeps `limiter` so keys of clients that went quiet for a
/// full window stop occupying memory.
///
/// Runs until the process exits; spawn it with `tokio::spawn`.
pub async fn run_limiter_sweeper(limiter: Arc<SlidingWindowLimiter>, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let removed = limiter.sweep();
        if removed > 0 {
            tracing::debug!(
                removed,
                remaining = limiter.tracked_keys(),
                "Swept idle rate-limit keys"
            );
        }
    }
}
