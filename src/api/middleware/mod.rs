//! HTTP middleware shared by both services.
//!
//! - [`client_ip`] - rate-limit key from the caller's address
//! - [`admission`] - rate limit, authentication and role guards
//! - [`metrics`] - latency and outcome recording, scrape endpoint
//! - [`tracing`] - request spans

pub mod admission;
pub mod client_ip;
pub mod metrics;
pub mod tracing;
