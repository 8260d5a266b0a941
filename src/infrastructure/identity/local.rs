//! In-process identity authority for the service that issues the tokens.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::entities::Principal;
use crate::domain::identity::{IdentityAuthority, IdentityError};
use crate::domain::repositories::UserRepository;
use crate::infrastructure::auth::JwtService;

/// Validates tokens locally: signature and expiry via [`JwtService`], then
/// the subject must still exist in the user repository.
pub struct LocalIdentityAuthority {
    jwt: Arc<JwtService>,
    users: Arc<dyn UserRepository>,
}

impl LocalIdentityAuthority {
    pub fn new(jwt: Arc<JwtService>, users: Arc<dyn UserRepository>) -> Self {
        Self { jwt, users }
    }
}

#[async_trait]
impl IdentityAuthority for LocalIdentityAuthority {
    async fn introspect(&self, token: &str) -> Result<Principal, IdentityError> {
        let claims = self
            .jwt
            .verify(token)
            .map_err(|e| IdentityError::Rejected(e.to_string()))?;

        let user = self
            .users
            .find_by_username(&claims.sub)
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?
            .ok_or_else(|| IdentityError::Rejected("unknown subject".to_string()))?;

        Ok(user.principal())
    }
}
