//! Account registration, login and logout.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::HealthCheck;
use crate::domain::entities::{NewUser, User};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::infrastructure::auth::{IssuedToken, JwtService, PasswordHasher};
use crate::infrastructure::revocation::RevocationStore;

/// Revocation TTL used when a token's own expiry cannot be read.
pub const FALLBACK_REVOCATION_TTL: Duration = Duration::from_secs(15 * 60);

/// Service behind the user service's account endpoints.
pub struct SessionService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    jwt: Arc<JwtService>,
    revocations: Arc<dyn RevocationStore>,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: PasswordHasher,
        jwt: Arc<JwtService>,
        revocations: Arc<dyn RevocationStore>,
    ) -> Self {
        Self {
            users,
            hasher,
            jwt,
            revocations,
        }
    }

    /// Registers a regular (non-admin) user.
    ///
    /// # Errors
    ///
    /// Returns a 400 `Username already exists` if the username is taken.
    pub async fn register(&self, username: &str, password: String) -> Result<User, AppError> {
        self.create_account(username, password, false).await
    }

    /// Creates an admin account. Only reachable from the command line.
    ///
    /// # Errors
    ///
    /// Returns a 400 `Username already exists` if the username is taken.
    pub async fn create_admin(&self, username: &str, password: String) -> Result<User, AppError> {
        self.create_account(username, password, true).await
    }

    async fn create_account(
        &self,
        username: &str,
        password: String,
        is_admin: bool,
    ) -> Result<User, AppError> {
        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::bad_request("Username already exists"));
        }

        let password_hash = self.hasher.hash(password).await?;
        let user = self
            .users
            .create(NewUser {
                username: username.to_string(),
                password_hash,
                is_admin,
            })
            .await?;

        tracing::info!(user = %user.username, role = user.role(), "Account created");
        Ok(user)
    }

    /// Verifies credentials and issues an access token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] with the same message for unknown
    /// users and wrong passwords.
    pub async fn login(&self, username: &str, password: String) -> Result<(User, IssuedToken), AppError> {
        let invalid = || AppError::unauthorized("Invalid credentials");

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(invalid)?;

        if !self
            .hasher
            .verify(password, user.password_hash.clone())
            .await?
        {
            return Err(invalid());
        }

        let issued = self
            .jwt
            .issue(&user)
            .map_err(|_| AppError::internal("Failed to issue token"))?;

        Ok((user, issued))
    }

    /// Revokes `token` until it would have expired on its own.
    ///
    /// The TTL comes from the token's `exp` claim; if that cannot be read the
    /// entry falls back to [`FALLBACK_REVOCATION_TTL`]. Returns the TTL used.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the revocation store write fails, so
    /// the caller never believes a logout succeeded when it did not.
    pub async fn logout(&self, token: &str) -> Result<Duration, AppError> {
        let ttl = self.revocation_ttl(token);

        self.revocations.revoke(token, ttl).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to revoke token");
            AppError::internal("Unable to log out, please retry")
        })?;

        Ok(ttl)
    }

    fn revocation_ttl(&self, token: &str) -> Duration {
        match self.jwt.remaining_lifetime(token) {
            Some(left) => left.max(Duration::from_secs(1)),
            None => {
                tracing::warn!("Token expiry unreadable, using fallback revocation TTL");
                FALLBACK_REVOCATION_TTL
            }
        }
    }
}

#[async_trait]
impl HealthCheck for SessionService {
    async fn database_ok(&self) -> bool {
        self.users.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUserRepository;
    use crate::infrastructure::revocation::{MockRevocationStore, RevocationError};

    fn jwt() -> Arc<JwtService> {
        Arc::new(JwtService::new(
            "test-secret-key-at-least-32-characters-long",
            Duration::from_secs(1800),
        ))
    }

    fn hasher() -> PasswordHasher {
        PasswordHasher::with_params(1024, 1, 1)
    }

    fn service(users: MockUserRepository, store: MockRevocationStore) -> SessionService {
        SessionService::new(Arc::new(users), hasher(), jwt(), Arc::new(store))
    }

    async fn stored_user(password: &str) -> User {
        User {
            id: 5,
            username: "frank".to_string(),
            password_hash: hasher().hash(password.to_string()).await.unwrap(),
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate() {
        let existing = stored_user("pw").await;
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(Some(existing.clone())));
        users.expect_create().times(0);

        let err = service(users, MockRevocationStore::new())
            .register("frank", "pw".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(ref m) if m == "Username already exists"));
        assert_eq!(
            axum::response::IntoResponse::into_response(err).status(),
            axum::http::StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_register_hashes_password_and_is_never_admin() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));
        users
            .expect_create()
            .withf(|new_user| {
                !new_user.is_admin && new_user.password_hash.starts_with("$argon2id$")
            })
            .times(1)
            .returning(|new_user| {
                Ok(User {
                    id: 1,
                    username: new_user.username,
                    password_hash: new_user.password_hash,
                    is_admin: new_user.is_admin,
                })
            });

        let user = service(users, MockRevocationStore::new())
            .register("grace", "s3cret".to_string())
            .await
            .unwrap();

        assert_eq!(user.username, "grace");
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_is_unauthorized() {
        let user = stored_user("right").await;
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(Some(user.clone())));

        let err = service(users, MockRevocationStore::new())
            .login("frank", "wrong".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unauthorized(ref m) if m == "Invalid credentials"));
    }

    #[tokio::test]
    async fn test_login_unknown_user_is_unauthorized() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));

        let result = service(users, MockRevocationStore::new())
            .login("nobody", "pw".to_string())
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let user = stored_user("right").await;
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(Some(user.clone())));

        let (user, issued) = service(users, MockRevocationStore::new())
            .login("frank", "right".to_string())
            .await
            .unwrap();

        let claims = jwt().verify(&issued.token).unwrap();
        assert_eq!(claims.sub, user.username);
        assert_eq!(claims.role, "user");
    }

    #[tokio::test]
    async fn test_logout_revokes_for_remaining_lifetime() {
        let jwt = jwt();
        let user = stored_user("pw").await;
        let token = jwt.issue(&user).unwrap().token;

        let mut store = MockRevocationStore::new();
        store
            .expect_revoke()
            .withf(|_, ttl| {
                *ttl <= Duration::from_secs(1800) && *ttl > Duration::from_secs(1790)
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let service = SessionService::new(
            Arc::new(MockUserRepository::new()),
            hasher(),
            jwt,
            Arc::new(store),
        );

        let ttl = service.logout(&token).await.unwrap();
        assert!(ttl > Duration::from_secs(1790));
    }

    #[tokio::test]
    async fn test_logout_falls_back_when_expiry_unreadable() {
        let mut store = MockRevocationStore::new();
        store
            .expect_revoke()
            .withf(|_, ttl| *ttl == FALLBACK_REVOCATION_TTL)
            .times(1)
            .returning(|_, _| Ok(()));

        let ttl = service(MockUserRepository::new(), store)
            .logout("opaque-token")
            .await
            .unwrap();

        assert_eq!(ttl, FALLBACK_REVOCATION_TTL);
    }

    #[tokio::test]
    async fn test_logout_store_failure_is_internal() {
        let mut store = MockRevocationStore::new();
        store
            .expect_revoke()
            .returning(|_, _| Err(RevocationError::Timeout(Duration::from_secs(1))));

        let err = service(MockUserRepository::new(), store)
            .logout("opaque-token")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn test_create_admin_sets_flag() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));
        users
            .expect_create()
            .withf(|new_user| new_user.is_admin)
            .times(1)
            .returning(|new_user| {
                Ok(User {
                    id: 2,
                    username: new_user.username,
                    password_hash: new_user.password_hash,
                    is_admin: new_user.is_admin,
                })
            });

        let user = service(users, MockRevocationStore::new())
            .create_admin("root", "s3cret".to_string())
            .await
            .unwrap();

        assert_eq!(user.role(), "admin");
    }
}
