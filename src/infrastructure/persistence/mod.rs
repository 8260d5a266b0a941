//! PostgreSQL repository implementations.
//!
//! Each repository holds a shared `Arc<PgPool>` and implements one trait
//! from [`crate::domain::repositories`].

mod pg_car_repository;
mod pg_user_repository;

pub use pg_car_repository::PgCarRepository;
pub use pg_user_repository::PgUserRepository;
