//! Data Transfer Objects for API requests and responses.
//!
//! Request DTOs derive `validator::Validate`; handlers validate before
//! calling a service.

pub mod car;
pub mod health;
pub mod user;
