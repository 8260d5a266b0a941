//! Business logic services for the application layer.

use async_trait::async_trait;

pub mod car_service;
pub mod session_service;
pub mod token_authenticator;

pub use car_service::CarService;
pub use session_service::SessionService;
pub use token_authenticator::{TokenAuthenticator, require_admin};

/// Backing-store check used by the health endpoint of each service.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn database_ok(&self) -> bool;
}
