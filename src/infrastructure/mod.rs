//! Infrastructure layer for external integrations.
//!
//! Implements the contracts defined by the domain layer.
//!
//! # Modules
//!
//! - [`auth`] - JWT issuing/validation and Argon2 password hashing
//! - [`identity`] - Identity authority clients (remote HTTP and local)
//! - [`persistence`] - PostgreSQL repository implementations
//! - [`revocation`] - Token revocation store (Redis and in-memory)

pub mod auth;
pub mod identity;
pub mod persistence;
pub mod revocation;
