//! Per-client sliding window rate limiter.
//!
//! Each [`ClientKey`] owns an ordered log of admission timestamps. On every
//! check the log is pruned to the current window and its length is the
//! caller's current count.
//!
//! # Concurrency
//!
//! Logs live in a [`DashMap`]. The prune-count-append sequence runs while the
//! entry guard holds the shard's write lock, so two concurrent checks for the
//! same key can never both observe the last free slot.
//!
//! # Memory
//!
//! Keys are never retired by [`SlidingWindowLimiter::admit`]. A periodic
//! [`SlidingWindowLimiter::sweep`] (see [`crate::domain::limiter_sweeper`])
//! drops keys whose pruned log is empty.

use dashmap::DashMap;
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

/// Rate-limit identity of a caller (its network address).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey(String);

impl ClientKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Rejected,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

/// Sliding window limiter admitting at most `times` requests per `window`.
pub struct SlidingWindowLimiter {
    times: u32,
    window: Duration,
    log: DashMap<ClientKey, VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    /// Creates a limiter admitting `times` requests per `seconds`-wide window.
    ///
    /// `times = 0` rejects every request.
    pub fn new(times: u32, seconds: u64) -> Self {
        Self {
            times,
            window: Duration::from_secs(seconds),
            log: DashMap::new(),
        }
    }

    pub fn times(&self) -> u32 {
        self.times
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Checks and records one request for `key` at the current instant.
    pub fn admit(&self, key: &ClientKey) -> Decision {
        self.admit_at(key, Instant::now())
    }

    /// Checks and records one request for `key` as if made at `now`.
    ///
    /// Timestamps at or before `now - window` are discarded first; the
    /// request is rejected without being recorded when the remaining count
    /// has reached `times`.
    pub fn admit_at(&self, key: &ClientKey, now: Instant) -> Decision {
        if self.times == 0 {
            return Decision::Rejected;
        }

        let mut entry = self.log.entry(key.clone()).or_default();
        let timestamps = entry.value_mut();

        prune(timestamps, now.checked_sub(self.window));

        if timestamps.len() >= self.times as usize {
            return Decision::Rejected;
        }

        timestamps.push_back(now);
        Decision::Allowed
    }

    /// Requests currently counted against `key`, without recording one.
    pub fn current_count(&self, key: &ClientKey) -> usize {
        self.current_count_at(key, Instant::now())
    }

    pub fn current_count_at(&self, key: &ClientKey, now: Instant) -> usize {
        let cutoff = now.checked_sub(self.window);
        self.log
            .get(key)
            .map(|ts| ts.iter().filter(|t| cutoff.is_none_or(|c| **t > c)).count())
            .unwrap_or(0)
    }

    /// Number of keys with a retained log.
    pub fn tracked_keys(&self) -> usize {
        self.log.len()
    }

    /// Prunes every log and drops keys left empty. Returns the number of keys removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub fn sweep_at(&self, now: Instant) -> usize {
        let cutoff = now.checked_sub(self.window);
        let before = self.log.len();

        self.log.retain(|_, timestamps| {
            prune(timestamps, cutoff);
            !timestamps.is_empty()
        });

        before.saturating_sub(self.log.len())
    }
}

/// Drops timestamps that are not strictly newer than `cutoff`.
fn prune(timestamps: &mut VecDeque<Instant>, cutoff: Option<Instant>) {
    let Some(cutoff) = cutoff else {
        return;
    };

    while timestamps.front().is_some_and(|t| *t <= cutoff) {
        timestamps.pop_front();
    }
}
