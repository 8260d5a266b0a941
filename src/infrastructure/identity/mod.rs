//! Identity authority implementations.
//!
//! - [`HttpIdentityAuthority`] - calls the user service's `/user-info` endpoint
//! - [`LocalIdentityAuthority`] - validates tokens in-process (used by the user service)

mod http;
mod local;

pub use http::HttpIdentityAuthority;
pub use local::LocalIdentityAuthority;
