//! Handlers for registration, login, logout and token introspection.

use axum::{
    Extension, Form, Json,
    extract::{State, rejection::FormRejection},
};
use validator::Validate;

use crate::api::dto::user::{Credentials, LoginResponse, MessageResponse, RegisterResponse};
use crate::api::middleware::admission::BearerToken;
use crate::domain::entities::Principal;
use crate::error::AppError;
use crate::state::UserState;

fn credentials(form: Result<Form<Credentials>, FormRejection>) -> Result<Credentials, AppError> {
    let Form(credentials) = form.map_err(|e| AppError::bad_request(e.body_text()))?;
    credentials.validate()?;
    Ok(credentials)
}

/// `POST /api/user/register` (form: `username`, `password`)
///
/// # Errors
///
/// Returns 400 `Username already exists` for a taken name.
pub async fn register_handler(
    State(state): State<UserState>,
    form: Result<Form<Credentials>, FormRejection>,
) -> Result<Json<RegisterResponse>, AppError> {
    let Credentials { username, password } = credentials(form)?;
    let user = state.service.register(&username, password).await?;

    Ok(Json(RegisterResponse {
        message: "User registered successfully".to_string(),
        username: user.username,
    }))
}

/// `POST /api/user/login` (form: `username`, `password`)
///
/// # Errors
///
/// Returns 403 `Invalid credentials` for an unknown user or a wrong password.
pub async fn login_handler(
    State(state): State<UserState>,
    form: Result<Form<Credentials>, FormRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Credentials { username, password } = credentials(form)?;
    let (user, issued) = state.service.login(&username, password).await?;

    Ok(Json(LoginResponse {
        access_token: issued.token,
        token_type: "bearer".to_string(),
        message: format!("Login successfully with role {}", user.role()),
    }))
}

/// `POST /api/user/logout` (bearer)
///
/// The admission pipeline has already authenticated the token; this revokes
/// it for the rest of its lifetime.
pub async fn logout_handler(
    State(state): State<UserState>,
    principal: Principal,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> Result<Json<MessageResponse>, AppError> {
    let ttl = state.service.logout(&token).await?;
    tracing::info!(user = %principal.username, ttl_secs = ttl.as_secs(), "Token revoked");

    Ok(Json(MessageResponse {
        message: "Log out successfully".to_string(),
    }))
}

/// `GET /api/user/user-info` (bearer)
///
/// Introspection endpoint consumed by other services.
pub async fn user_info_handler(principal: Principal) -> Json<Principal> {
    Json(principal)
}
