//! Core domain entities.
//!
//! Entities are plain data structures without business logic.
//!
//! # Entity Types
//!
//! - [`Car`] - An inventory item served by the car service
//! - [`User`] - A registered account owned by the user service
//! - [`Principal`] - The identity resolved from a bearer token for one request
//!
//! Creation uses separate `New*` structs (`NewCar`, `NewUser`).

pub mod car;
pub mod principal;
pub mod user;

pub use car::{Car, NewCar};
pub use principal::Principal;
pub use user::{NewUser, User};
