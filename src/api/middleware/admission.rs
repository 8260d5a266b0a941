//! Request admission: ordered guards run before a handler.
//!
//! A guard either admits the request or rejects it with an [`AppError`].
//! Guards are composed into an [`AdmissionPipeline`] once, when routes are
//! registered, and the first rejection short-circuits the chain so the
//! handler never runs.
//!
//! # Guard Order
//!
//! ```text
//! rate limit -> authenticate -> require admin -> handler
//! ```
//!
//! Rate limiting always comes first so floods are turned away before the
//! identity authority is called. The introspection chain skips it; resource
//! services have already limited their callers before asking.
//!
//! # Example
//!
//! ```rust,ignore
//! let admission = Admission::new(limiter, ClientIdentityResolver::new(false), authenticator);
//!
//! let admin = Router::new()
//!     .route("/create", post(create_car))
//!     .route_layer(middleware::from_fn_with_state(admission.admin_only(), admission::layer));
//! ```

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use std::sync::Arc;

use crate::api::middleware::client_ip::ClientIdentityResolver;
use crate::api::middleware::metrics::RATE_LIMIT_REJECTIONS;
use crate::application::services::token_authenticator::MISSING_HEADER;
use crate::application::services::{TokenAuthenticator, require_admin};
use crate::domain::entities::Principal;
use crate::domain::rate_limiter::SlidingWindowLimiter;
use crate::error::AppError;

pub const RATE_LIMITED: &str = "Too many requests, please try again later.";

/// A single admission check.
#[async_trait]
pub trait Guard: Send + Sync {
    /// Admits the request or rejects it. May add extensions to `parts` for
    /// later guards and the handler.
    async fn check(&self, parts: &mut Parts) -> Result<(), AppError>;
}

/// Rejects callers that exceeded the sliding window limit.
pub struct RateLimitGuard {
    limiter: Arc<SlidingWindowLimiter>,
    resolver: ClientIdentityResolver,
}

impl RateLimitGuard {
    pub fn new(limiter: Arc<SlidingWindowLimiter>, resolver: ClientIdentityResolver) -> Self {
        Self { limiter, resolver }
    }
}

#[async_trait]
impl Guard for RateLimitGuard {
    async fn check(&self, parts: &mut Parts) -> Result<(), AppError> {
        let key = self.resolver.resolve(parts);

        if self.limiter.admit(&key).is_allowed() {
            return Ok(());
        }

        metrics::counter!(RATE_LIMIT_REJECTIONS).increment(1);
        tracing::debug!(client = %key, path = %parts.uri.path(), "Rate limit exceeded");
        Err(AppError::rate_limited(RATE_LIMITED))
    }
}

/// Raw bearer token of an authenticated request, for handlers that act on
/// the token itself (logout).
#[derive(Clone)]
pub struct BearerToken(pub String);

/// Authenticates the bearer token and stores the [`Principal`] and the
/// [`BearerToken`] in the request extensions.
pub struct AuthenticateGuard {
    authenticator: Arc<TokenAuthenticator>,
}

impl AuthenticateGuard {
    pub fn new(authenticator: Arc<TokenAuthenticator>) -> Self {
        Self { authenticator }
    }
}

#[async_trait]
impl Guard for AuthenticateGuard {
    async fn check(&self, parts: &mut Parts) -> Result<(), AppError> {
        let AuthBearer(token) = AuthBearer::from_request_parts(parts, &())
            .await
            .map_err(|_| AppError::unauthorized(MISSING_HEADER))?;

        let principal = self.authenticator.authenticate(&token).await?;
        parts.extensions.insert(principal);
        parts.extensions.insert(BearerToken(token));

        Ok(())
    }
}

/// Admits only admin principals. Must run after [`AuthenticateGuard`].
pub struct RequireAdminGuard;

#[async_trait]
impl Guard for RequireAdminGuard {
    async fn check(&self, parts: &mut Parts) -> Result<(), AppError> {
        let principal = parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized(MISSING_HEADER))?;

        require_admin(principal).map(|_| ())
    }
}

/// An ordered, immutable list of guards.
#[derive(Clone)]
pub struct AdmissionPipeline {
    guards: Arc<[Arc<dyn Guard>]>,
}

impl AdmissionPipeline {
    pub fn new(guards: Vec<Arc<dyn Guard>>) -> Self {
        Self {
            guards: guards.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Runs every guard in order, stopping at the first rejection.
    pub async fn admit(&self, parts: &mut Parts) -> Result<(), AppError> {
        for guard in self.guards.iter() {
            guard.check(parts).await?;
        }
        Ok(())
    }
}

/// The guard chains used by route registration.
#[derive(Clone)]
pub struct Admission {
    rate_limit: Arc<dyn Guard>,
    authenticate: Arc<dyn Guard>,
    require_admin: Arc<dyn Guard>,
}

impl Admission {
    pub fn new(
        limiter: Arc<SlidingWindowLimiter>,
        resolver: ClientIdentityResolver,
        authenticator: Arc<TokenAuthenticator>,
    ) -> Self {
        Self {
            rate_limit: Arc::new(RateLimitGuard::new(limiter, resolver)),
            authenticate: Arc::new(AuthenticateGuard::new(authenticator)),
            require_admin: Arc::new(RequireAdminGuard),
        }
    }

    /// Rate limit only.
    pub fn public(&self) -> AdmissionPipeline {
        AdmissionPipeline::new(vec![self.rate_limit.clone()])
    }

    /// Rate limit, then authenticate.
    pub fn authenticated(&self) -> AdmissionPipeline {
        AdmissionPipeline::new(vec![self.rate_limit.clone(), self.authenticate.clone()])
    }

    /// Authenticate only.
    ///
    /// For token introspection: resource services call it once per request
    /// of their own callers, all from the same address, so a per-address
    /// limit here would throttle every user of those services together.
    pub fn introspection(&self) -> AdmissionPipeline {
        AdmissionPipeline::new(vec![self.authenticate.clone()])
    }

    /// Rate limit, authenticate, then require the admin role.
    pub fn admin_only(&self) -> AdmissionPipeline {
        AdmissionPipeline::new(vec![
            self.rate_limit.clone(),
            self.authenticate.clone(),
            self.require_admin.clone(),
        ])
    }
}

/// Middleware running an [`AdmissionPipeline`] in front of the inner service.
///
/// # Errors
///
/// Returns the first guard's rejection: 409 when rate limited, 403 for
/// missing, revoked or rejected tokens and for non-admin callers on admin
/// routes.
pub async fn layer(
    State(pipeline): State<AdmissionPipeline>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    pipeline.admit(&mut parts).await?;

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized(MISSING_HEADER))
    }
}
