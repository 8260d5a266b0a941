//! Identity authority contract.
//!
//! The identity authority is whoever can turn a bearer token into a
//! [`Principal`]: the user service itself (local JWT validation) or, for the
//! car service, the user service's introspection endpoint over HTTP.

use async_trait::async_trait;

use crate::domain::entities::Principal;

/// Errors reported by an identity authority.
///
/// The token authenticator collapses every variant into the same
/// unauthorized response; the distinction exists only for logging.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The authority looked at the token and refused it.
    #[error("token rejected by identity authority: {0}")]
    Rejected(String),
    /// The authority could not be reached or did not answer in time.
    #[error("identity authority unavailable: {0}")]
    Unavailable(String),
    /// The authority answered with something that is not an identity.
    #[error("malformed identity authority response: {0}")]
    Malformed(String),
}

/// Resolves bearer tokens into principals.
///
/// # Implementations
///
/// - [`crate::infrastructure::identity::HttpIdentityAuthority`] - remote introspection
/// - [`crate::infrastructure::identity::LocalIdentityAuthority`] - in-process JWT validation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityAuthority: Send + Sync {
    /// Validates `token` and returns the identity it belongs to.
    async fn introspect(&self, token: &str) -> Result<Principal, IdentityError>;
}
