//! HTTP request handlers for API endpoints.

pub mod cars;
pub mod health;
pub mod users;

pub use cars::{create_car_handler, delete_car_handler, list_cars_handler, update_car_handler};
pub use health::health_handler;
pub use users::{login_handler, logout_handler, register_handler, user_info_handler};
