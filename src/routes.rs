//! Top-level routers for the two services.
//!
//! # Route Structure
//!
//! User service:
//!
//! - `/api/user/*`  - Account endpoints (see [`api::routes::user_routes`])
//! - `GET /health`  - Database and revocation store checks
//! - `GET /metrics` - Prometheus scrape endpoint
//!
//! Car service:
//!
//! - `/api/cars/*`  - Inventory endpoints (see [`api::routes::car_routes`])
//! - `GET /health`, `GET /metrics`
//!
//! # Middleware
//!
//! Outermost first: tracing, metrics, then the per-group admission chain.
//! Metrics therefore see guard rejections, 404 fallbacks and panics.

use axum::routing::get;
use axum::{Router, middleware};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::admission::Admission;
use crate::api::middleware::{metrics, tracing};
use crate::application::services::HealthCheck;
use crate::state::{AppState, CarState, UserState};

/// Router of the user/auth service.
pub fn user_app(state: UserState, admission: &Admission, metrics_handle: PrometheusHandle) -> Router {
    service_app(
        Router::new().nest("/api/user", api::routes::user_routes(admission)),
        state,
        metrics_handle,
    )
}

/// Router of the car inventory service.
pub fn car_app(state: CarState, admission: &Admission, metrics_handle: PrometheusHandle) -> Router {
    service_app(
        Router::new().nest("/api/cars", api::routes::car_routes(admission)),
        state,
        metrics_handle,
    )
}

fn service_app<S>(api: Router<AppState<S>>, state: AppState<S>, handle: PrometheusHandle) -> Router
where
    S: HealthCheck + 'static,
{
    api.route("/health", get(health_handler::<S>))
        .route(
            "/metrics",
            get(metrics::metrics_handler).with_state(handle),
        )
        .with_state(state)
        .layer(middleware::from_fn(metrics::layer))
        .layer(tracing::layer())
}
