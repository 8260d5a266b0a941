//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::application::services::HealthCheck;
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected" },
///     "revocation_store": { "status": "ok", "message": "Reachable" }
///   }
/// }
/// ```
pub async fn health_handler<S>(
    State(state): State<AppState<S>>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)>
where
    S: HealthCheck + 'static,
{
    let database = if state.service.database_ok().await {
        CheckStatus::ok("Connected")
    } else {
        CheckStatus::error("Database unreachable")
    };

    let revocation_store = if state.revocations.health_check().await {
        CheckStatus::ok("Reachable")
    } else {
        CheckStatus::error("Revocation store unreachable")
    };

    let all_healthy = database.is_ok() && revocation_store.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database,
            revocation_store,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
