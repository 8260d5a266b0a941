//! Application layer services implementing business logic.
//!
//! Services consume the domain's repository and authority traits and give
//! HTTP handlers and middleware a small, typed API.
//!
//! # Available Services
//!
//! - [`services::TokenAuthenticator`] - Bearer token admission (revocation, then identity authority)
//! - [`services::SessionService`] - Registration, login and logout with token revocation
//! - [`services::CarService`] - Car inventory CRUD

pub mod services;
