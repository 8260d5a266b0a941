//! REST API layer for HTTP request/response handling.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Admission guards, metrics and tracing
//! - [`routes`] - Per-service route groups

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
