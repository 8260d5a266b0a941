//! Shared handler state.

use std::sync::Arc;

use crate::application::services::{CarService, SessionService};
use crate::infrastructure::revocation::RevocationStore;

/// State injected into a service's handlers.
///
/// `S` is the service the handlers drive. The revocation store is carried
/// alongside so the health endpoint can check it.
pub struct AppState<S> {
    pub service: Arc<S>,
    pub revocations: Arc<dyn RevocationStore>,
}

impl<S> AppState<S> {
    pub fn new(service: Arc<S>, revocations: Arc<dyn RevocationStore>) -> Self {
        Self {
            service,
            revocations,
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            revocations: Arc::clone(&self.revocations),
        }
    }
}

pub type CarState = AppState<CarService>;
pub type UserState = AppState<SessionService>;
