//! Repository trait for car inventory data access.

use crate::domain::entities::{Car, NewCar};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the car inventory.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgCarRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CarRepository: Send + Sync {
    /// Lists every car ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self) -> Result<Vec<Car>, AppError>;

    /// Inserts a new car and returns it with its assigned id.
    async fn create(&self, new_car: NewCar) -> Result<Car, AppError>;

    /// Replaces every field of an existing car.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Car))` with the stored values
    /// - `Ok(None)` if no car has this id
    async fn update(&self, id: i64, car: NewCar) -> Result<Option<Car>, AppError>;

    /// Deletes a car.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if a row was removed, `Ok(false)` if the id was unknown.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Checks database connectivity for the health endpoint.
    async fn health_check(&self) -> bool;
}
