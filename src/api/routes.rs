//! API route configuration.
//!
//! Each route group gets its admission chain once, here, through
//! `route_layer`, so unmatched paths never run the guards.

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::api::handlers::{
    create_car_handler, delete_car_handler, list_cars_handler, login_handler, logout_handler,
    register_handler, update_car_handler, user_info_handler,
};
use crate::api::middleware::admission::{self, Admission};
use crate::state::{CarState, UserState};

/// Car inventory routes, nested under `/api/cars`.
///
/// # Endpoints
///
/// - `GET    /list`          - List cars (authenticated)
/// - `POST   /create`        - Create a car (admin)
/// - `PUT    /update/{id}`   - Replace a car (admin)
/// - `DELETE /delete/{id}`   - Delete a car (admin)
pub fn car_routes(admission: &Admission) -> Router<CarState> {
    let authenticated = Router::new()
        .route("/list", get(list_cars_handler))
        .route_layer(middleware::from_fn_with_state(
            admission.authenticated(),
            admission::layer,
        ));

    let admin = Router::new()
        .route("/create", post(create_car_handler))
        .route("/update/{id}", put(update_car_handler))
        .route("/delete/{id}", delete(delete_car_handler))
        .route_layer(middleware::from_fn_with_state(
            admission.admin_only(),
            admission::layer,
        ));

    Router::new().merge(authenticated).merge(admin)
}

/// Account routes, nested under `/api/user`.
///
/// # Endpoints
///
/// - `POST /register`   - Create an account (rate limited)
/// - `POST /login`      - Issue a token (rate limited)
/// - `POST /logout`     - Revoke the presented token (authenticated)
/// - `GET  /user-info`  - Token introspection (authenticated, not rate limited)
pub fn user_routes(admission: &Admission) -> Router<UserState> {
    let public = Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route_layer(middleware::from_fn_with_state(
            admission.public(),
            admission::layer,
        ));

    let authenticated = Router::new()
        .route("/logout", post(logout_handler))
        .route_layer(middleware::from_fn_with_state(
            admission.authenticated(),
            admission::layer,
        ));

    let introspection = Router::new()
        .route("/user-info", get(user_info_handler))
        .route_layer(middleware::from_fn_with_state(
            admission.introspection(),
            admission::layer,
        ));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .merge(introspection)
}
