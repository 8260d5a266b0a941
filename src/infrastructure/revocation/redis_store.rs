//! Redis-backed revocation store.

use super::service::{RevocationError, RevocationResult, RevocationStore, revocation_key, ttl_seconds};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Upper bound on connecting and the initial PING.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis revocation store.
///
/// Entries are written with `SET key 1 EX ttl` and checked with `EXISTS key`,
/// so Redis expires them on its own. Every command is bounded by
/// `op_timeout`; a slow Redis surfaces as [`RevocationError::Timeout`]
/// instead of stalling the request.
pub struct RedisRevocationStore {
    client: ConnectionManager,
    op_timeout: Duration,
}

impl RedisRevocationStore {
    /// Connects to Redis and validates the connection with a PING, giving up
    /// after [`CONNECT_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns [`RevocationError::ConnectionError`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str, op_timeout: Duration) -> RevocationResult<Self> {
        Self::connect_within(redis_url, op_timeout, CONNECT_TIMEOUT).await
    }

    /// Like [`connect`](Self::connect) with an explicit connect deadline.
    pub async fn connect_within(
        redis_url: &str,
        op_timeout: Duration,
        connect_timeout: Duration,
    ) -> RevocationResult<Self> {
        info!("Connecting to revocation store");

        let client = Client::open(redis_url).map_err(|e| {
            RevocationError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let handshake = async {
            let manager = ConnectionManager::new(client).await.map_err(|e| {
                RevocationError::ConnectionError(format!("Failed to connect to Redis: {}", e))
            })?;

            let mut test_conn = manager.clone();
            test_conn.ping::<()>().await.map_err(|e| {
                RevocationError::ConnectionError(format!("Redis PING failed: {}", e))
            })?;

            Ok::<_, RevocationError>(manager)
        };

        let manager = tokio::time::timeout(connect_timeout, handshake)
            .await
            .map_err(|_| {
                RevocationError::ConnectionError(format!(
                    "Redis did not answer within {:?}",
                    connect_timeout
                ))
            })??;

        info!("Connected to revocation store (Redis)");

        Ok(Self {
            client: manager,
            op_timeout,
        })
    }
}

/// Runs a Redis command, turning an elapsed `op_timeout` into
/// [`RevocationError::Timeout`].
async fn bounded<T, F>(op_timeout: Duration, op: F) -> RevocationResult<T>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(op_timeout, op).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(RevocationError::OperationError(e.to_string())),
        Err(_) => Err(RevocationError::Timeout(op_timeout)),
    }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn is_revoked(&self, token: &str) -> RevocationResult<bool> {
        let key = revocation_key(token);
        let mut conn = self.client.clone();

        bounded(self.op_timeout, conn.exists::<_, bool>(&key)).await
    }

    async fn revoke(&self, token: &str, ttl: Duration) -> RevocationResult<()> {
        let key = revocation_key(token);
        let mut conn = self.client.clone();
        let seconds = ttl_seconds(ttl);

        bounded(self.op_timeout, conn.set_ex::<_, _, ()>(&key, 1, seconds)).await?;

        debug!(ttl_seconds = seconds, "Token revoked");
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        bounded(self.op_timeout, conn.ping::<()>()).await.is_ok()
    }
}
