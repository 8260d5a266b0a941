//! Bearer token authentication and role checks.

use std::sync::Arc;

use crate::domain::entities::Principal;
use crate::domain::identity::{IdentityAuthority, IdentityError};
use crate::error::AppError;
use crate::infrastructure::revocation::RevocationStore;

pub const MISSING_HEADER: &str = "Authorization header missing";
pub const REVOKED: &str = "Token has been revoked";
pub const INVALID_TOKEN: &str = "Invalid or expired token";
pub const ADMIN_ONLY: &str = "Admin feature only. You do not have permission to access this feature.";

/// Turns a raw bearer token into a [`Principal`].
///
/// # Authentication Flow
///
/// 1. Reject empty tokens
/// 2. Consult the revocation store; a revoked token is rejected even if the
///    identity authority would still accept it
/// 3. Ask the identity authority to introspect the token
///
/// # Failure Policy
///
/// Fail closed. A revocation store error rejects the request, because the
/// store cannot confirm the token was not logged out. Identity authority
/// rejections, outages and timeouts all become the same
/// [`AppError::Unauthorized`] so the authority's internal detail never
/// reaches the caller.
pub struct TokenAuthenticator {
    revocations: Arc<dyn RevocationStore>,
    authority: Arc<dyn IdentityAuthority>,
}

impl TokenAuthenticator {
    pub fn new(revocations: Arc<dyn RevocationStore>, authority: Arc<dyn IdentityAuthority>) -> Self {
        Self {
            revocations,
            authority,
        }
    }

    /// Authenticates `token` (scheme prefix already stripped).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is empty, revoked,
    /// rejected by the authority, or if either collaborator is unavailable.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, AppError> {
        if token.trim().is_empty() {
            return Err(AppError::unauthorized(MISSING_HEADER));
        }

        match self.revocations.is_revoked(token).await {
            Ok(false) => {}
            Ok(true) => {
                tracing::debug!("Rejected revoked token");
                return Err(AppError::unauthorized(REVOKED));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Revocation lookup failed, rejecting token");
                return Err(AppError::unauthorized(INVALID_TOKEN));
            }
        }

        self.authority.introspect(token).await.map_err(|e| {
            match &e {
                IdentityError::Rejected(reason) => {
                    tracing::debug!(%reason, "Identity authority rejected token")
                }
                IdentityError::Unavailable(_) | IdentityError::Malformed(_) => {
                    tracing::warn!(error = %e, "Identity authority call failed")
                }
            }
            AppError::unauthorized(INVALID_TOKEN)
        })
    }
}

/// Passes `principal` through unchanged if it is an admin.
///
/// # Errors
///
/// Returns [`AppError::Forbidden`] for non-admin principals.
pub fn require_admin(principal: Principal) -> Result<Principal, AppError> {
    if principal.is_admin {
        Ok(principal)
    } else {
        tracing::debug!(user = %principal.username, "Admin route denied");
        Err(AppError::forbidden(ADMIN_ONLY))
    }
}
