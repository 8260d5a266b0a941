//! Car inventory service.

use async_trait::async_trait;
use std::sync::Arc;

use super::HealthCheck;
use crate::domain::entities::{Car, NewCar};
use crate::domain::repositories::CarRepository;
use crate::error::AppError;

const CAR_NOT_FOUND: &str = "car not found";

/// Thin service over [`CarRepository`] that turns missing rows into
/// [`AppError::NotFound`].
pub struct CarService {
    repository: Arc<dyn CarRepository>,
}

impl CarService {
    pub fn new(repository: Arc<dyn CarRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> Result<Vec<Car>, AppError> {
        self.repository.list().await
    }

    pub async fn create(&self, new_car: NewCar) -> Result<Car, AppError> {
        let car = self.repository.create(new_car).await?;
        tracing::info!(car_id = car.id, "Car created");
        Ok(car)
    }

    /// Replaces a car.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if `id` does not exist.
    pub async fn update(&self, id: i64, car: NewCar) -> Result<Car, AppError> {
        self.repository
            .update(id, car)
            .await?
            .ok_or_else(|| AppError::not_found(CAR_NOT_FOUND))
    }

    /// Deletes a car.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if `id` does not exist.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if self.repository.delete(id).await? {
            tracing::info!(car_id = id, "Car deleted");
            Ok(())
        } else {
            Err(AppError::not_found(CAR_NOT_FOUND))
        }
    }
}

#[async_trait]
impl HealthCheck for CarService {
    async fn database_ok(&self) -> bool {
        self.repository.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockCarRepository;

    fn new_car() -> NewCar {
        NewCar {
            name: "Model 3".to_string(),
            brand: "Tesla".to_string(),
            image_url: "https://img.example.com/m3.png".to_string(),
            price: 40_000,
            description: "Electric sedan".to_string(),
            is_available: true,
        }
    }

    #[tokio::test]
    async fn test_update_missing_car_is_not_found() {
        let mut repo = MockCarRepository::new();
        repo.expect_update().times(1).returning(|_, _| Ok(None));

        let err = CarService::new(Arc::new(repo))
            .update(99, new_car())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(ref m) if m == "car not found"));
    }

    #[tokio::test]
    async fn test_update_returns_stored_car() {
        let mut repo = MockCarRepository::new();
        repo.expect_update()
            .withf(|id, _| *id == 4)
            .returning(|id, car| Ok(Some(Car::from_new(id, car))));

        let car = CarService::new(Arc::new(repo))
            .update(4, new_car())
            .await
            .unwrap();

        assert_eq!(car.id, 4);
        assert_eq!(car.brand, "Tesla");
    }

    #[tokio::test]
    async fn test_delete_missing_car_is_not_found() {
        let mut repo = MockCarRepository::new();
        repo.expect_delete().returning(|_| Ok(false));

        let result = CarService::new(Arc::new(repo)).delete(1).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_existing_car() {
        let mut repo = MockCarRepository::new();
        repo.expect_delete().withf(|id| *id == 2).returning(|_| Ok(true));

        assert!(CarService::new(Arc::new(repo)).delete(2).await.is_ok());
    }
}
