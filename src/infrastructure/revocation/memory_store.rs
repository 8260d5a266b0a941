//! In-process revocation store.

use super::service::{RevocationResult, RevocationStore, revocation_key, ttl_seconds};
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Revocation store kept in process memory.
///
/// Used when Redis is not configured. Revocations are only visible to this
/// process and are lost on restart, which is enough for a single
/// user-service instance. Expired entries are removed lazily on
/// lookup and by [`MemoryRevocationStore::purge_expired`].
pub struct MemoryRevocationStore {
    entries: DashMap<String, Instant>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        debug!("Using in-memory revocation store");
        Self {
            entries: DashMap::new(),
        }
    }

    /// Removes entries whose TTL has elapsed. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| *expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryRevocationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn is_revoked(&self, token: &str) -> RevocationResult<bool> {
        let key = revocation_key(token);
        let now = Instant::now();

        let live = match self.entries.get(&key) {
            Some(expires_at) => *expires_at > now,
            None => return Ok(false),
        };

        if !live {
            self.entries.remove_if(&key, |_, expires_at| *expires_at <= now);
        }

        Ok(live)
    }

    async fn revoke(&self, token: &str, ttl: Duration) -> RevocationResult<()> {
        let purged = self.purge_expired();
        if purged > 0 {
            debug!(purged, "Purged expired revocation entries");
        }

        let expires_at = Instant::now() + Duration::from_secs(ttl_seconds(ttl));
        self.entries.insert(revocation_key(token), expires_at);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
