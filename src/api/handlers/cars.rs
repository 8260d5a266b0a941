//! Handlers for car inventory endpoints.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::car::CarPayload;
use crate::domain::entities::{Car, Principal};
use crate::error::AppError;
use crate::state::CarState;

fn validated(payload: Result<Json<CarPayload>, JsonRejection>) -> Result<CarPayload, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::bad_request(e.body_text()))?;
    payload.validate()?;
    Ok(payload)
}

/// Lists every car.
///
/// # Endpoint
///
/// `GET /api/cars/list` (authenticated)
pub async fn list_cars_handler(
    State(state): State<CarState>,
    principal: Principal,
) -> Result<Json<Vec<Car>>, AppError> {
    tracing::debug!(user = %principal.username, "Listing cars");
    Ok(Json(state.service.list().await?))
}

/// Creates a car.
///
/// # Endpoint
///
/// `POST /api/cars/create` (admin only)
///
/// # Errors
///
/// Returns 400 if the body is malformed or fails validation.
pub async fn create_car_handler(
    State(state): State<CarState>,
    payload: Result<Json<CarPayload>, JsonRejection>,
) -> Result<Json<Car>, AppError> {
    let payload = validated(payload)?;
    Ok(Json(state.service.create(payload.into()).await?))
}

/// Replaces a car.
///
/// # Endpoint
///
/// `PUT /api/cars/update/{id}` (admin only)
///
/// # Errors
///
/// Returns 400 on an invalid body, 404 if the car does not exist.
pub async fn update_car_handler(
    Path(id): Path<i64>,
    State(state): State<CarState>,
    payload: Result<Json<CarPayload>, JsonRejection>,
) -> Result<Json<Car>, AppError> {
    let payload = validated(payload)?;
    Ok(Json(state.service.update(id, payload.into()).await?))
}

/// Deletes a car.
///
/// # Endpoint
///
/// `DELETE /api/cars/delete/{id}` (admin only)
///
/// # Errors
///
/// Returns 404 if the car does not exist.
pub async fn delete_car_handler(
    Path(id): Path<i64>,
    State(state): State<CarState>,
) -> Result<StatusCode, AppError> {
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
