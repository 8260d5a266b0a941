//! Token revocation store.
//!
//! Provides a [`RevocationStore`] trait with two implementations:
//! - [`RedisRevocationStore`] - Production store shared by every service instance
//! - [`MemoryRevocationStore`] - In-process store used when Redis is not configured

mod memory_store;
mod redis_store;
mod service;

pub use memory_store::MemoryRevocationStore;
pub use redis_store::RedisRevocationStore;
pub use service::{
    RevocationError, RevocationResult, RevocationStore, revocation_key, ttl_seconds,
};

#[cfg(test)]
pub use service::MockRevocationStore;
