//! Credential primitives: access tokens and password hashes.

mod jwt_service;
mod password_hasher;

pub use jwt_service::{Claims, IssuedToken, JwtService, TokenError};
pub use password_hasher::PasswordHasher;
