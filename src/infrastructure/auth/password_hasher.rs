//! Password hashing with Argon2id.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use crate::error::AppError;

/// Argon2id password hasher. Hashing runs on the blocking thread pool.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    const MEMORY_COST: u32 = 19_456;
    const TIME_COST: u32 = 2;
    const PARALLELISM: u32 = 1;
    const OUTPUT_LEN: usize = 32;

    /// Creates a hasher with OWASP-recommended parameters.
    pub fn new() -> Self {
        Self::with_params(Self::MEMORY_COST, Self::TIME_COST, Self::PARALLELISM)
    }

    /// Creates a hasher with custom cost parameters (cheap ones for tests).
    ///
    /// Falls back to Argon2's defaults if the combination is invalid.
    pub fn with_params(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        let params = Params::new(memory_cost, time_cost, parallelism, Some(Self::OUTPUT_LEN))
            .unwrap_or_else(|e| {
                tracing::warn!("Invalid Argon2 parameters ({}), using defaults", e);
                Params::default()
            });

        Self { params }
    }

    fn argon2(params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }

    /// Hashes `password` into a PHC string.
    pub async fn hash(&self, password: String) -> Result<String, AppError> {
        let params = self.params.clone();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Self::argon2(params)
                .hash_password(password.as_bytes(), &salt)
                .map(|h| h.to_string())
        })
        .await
        .map_err(|e| {
            tracing::error!("Password hash task panicked: {}", e);
            AppError::internal("Password hashing failed")
        })?
        .map_err(|e| {
            tracing::error!("Failed to hash password: {}", e);
            AppError::internal("Password hashing failed")
        })
    }

    /// Checks `password` against a stored PHC string. Malformed hashes never verify.
    pub async fn verify(&self, password: String, stored_hash: String) -> Result<bool, AppError> {
        let params = self.params.clone();

        tokio::task::spawn_blocking(move || {
            let Ok(parsed) = PasswordHash::new(&stored_hash) else {
                return false;
            };
            Self::argon2(params)
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .await
        .map_err(|e| {
            tracing::error!("Password verify task panicked: {}", e);
            AppError::internal("Password verification failed")
        })
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordHasher {
        PasswordHasher::with_params(1024, 1, 1)
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hasher = cheap();
        let hash = hasher.hash("hunter2".to_string()).await.unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("hunter2".to_string(), hash.clone()).await.unwrap());
        assert!(!hasher.verify("hunter3".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_never_verifies() {
        let ok = cheap()
            .verify("anything".to_string(), "plaintext".to_string())
            .await
            .unwrap();

        assert!(!ok);
    }
}
