//! Repository trait definitions for the domain layer.
//!
//! Traits define the data access contract; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`CarRepository`] - Car inventory CRUD
//! - [`UserRepository`] - User account lookup and registration

pub mod car_repository;
pub mod user_repository;

pub use car_repository::CarRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use car_repository::MockCarRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
