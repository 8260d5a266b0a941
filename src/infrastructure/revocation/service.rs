//! Revocation store trait and error types.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Errors that can occur while talking to the revocation store.
#[derive(Debug, thiserror::Error)]
pub enum RevocationError {
    #[error("Revocation store connection error: {0}")]
    ConnectionError(String),
    #[error("Revocation store operation error: {0}")]
    OperationError(String),
    #[error("Revocation store did not answer within {0:?}")]
    Timeout(Duration),
}

/// Result type for revocation store operations.
pub type RevocationResult<T> = Result<T, RevocationError>;

/// Records tokens invalidated before their natural expiry.
///
/// Unlike a cache, errors here are propagated: callers decide the failure
/// policy. The token authenticator fails closed (a lookup error rejects the
/// request).
///
/// # Implementations
///
/// - [`crate::infrastructure::revocation::RedisRevocationStore`] - shared store (`SET .. EX`, `EXISTS`)
/// - [`crate::infrastructure::revocation::MemoryRevocationStore`] - single-process fallback
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Returns `true` if `token` was revoked and its entry has not expired.
    async fn is_revoked(&self, token: &str) -> RevocationResult<bool>;

    /// Marks `token` revoked for `ttl` (rounded up to whole seconds, minimum 1s).
    async fn revoke(&self, token: &str, ttl: Duration) -> RevocationResult<()>;

    /// Checks if the store backend is reachable.
    async fn health_check(&self) -> bool;
}

/// Store key for a token. Raw tokens are never written to the store.
pub fn revocation_key(token: &str) -> String {
    format!("revoked:{}", hex::encode(Sha256::digest(token.as_bytes())))
}

/// TTL in whole seconds, rounding partial seconds up so an entry never
/// expires before the token does.
pub fn ttl_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revocation_key_hides_token() {
        let key = revocation_key("eyJhbGciOi.secret.sig");

        assert!(key.starts_with("revoked:"));
        assert_eq!(key.len(), "revoked:".len() + 64);
        assert!(!key.contains("secret"));
        assert_eq!(key, revocation_key("eyJhbGciOi.secret.sig"));
    }

    #[test]
    fn test_ttl_seconds_rounds_up() {
        assert_eq!(ttl_seconds(Duration::from_secs(900)), 900);
        assert_eq!(ttl_seconds(Duration::from_millis(1500)), 2);
        assert_eq!(ttl_seconds(Duration::ZERO), 1);
    }
}
