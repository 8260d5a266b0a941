//! Domain layer containing business entities and core admission logic.
//!
//! Independent of infrastructure and presentation concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`identity`] - Contract for resolving bearer tokens into principals
//! - [`rate_limiter`] - Per-client sliding window limiter
//! - [`limiter_sweeper`] - Background retirement of idle limiter keys
//!
//! # Design Principles
//!
//! - Repository and authority traits define contracts implemented by the
//!   infrastructure layer
//! - Business logic is encapsulated in services (see [`crate::application::services`])

pub mod entities;
pub mod identity;
pub mod limiter_sweeper;
pub mod rate_limiter;
pub mod repositories;
