//! PostgreSQL implementation of the car repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Car, NewCar};
use crate::domain::repositories::CarRepository;
use crate::error::AppError;

/// PostgreSQL repository for the `cars` table.
pub struct PgCarRepository {
    pool: Arc<PgPool>,
}

impl PgCarRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CarRepository for PgCarRepository {
    async fn list(&self) -> Result<Vec<Car>, AppError> {
        let cars = sqlx::query_as::<_, Car>(
            r#"
            SELECT id, name, brand, image_url, price, description, is_available
            FROM cars
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(cars)
    }

    async fn create(&self, new_car: NewCar) -> Result<Car, AppError> {
        let car = sqlx::query_as::<_, Car>(
            r#"
            INSERT INTO cars (name, brand, image_url, price, description, is_available)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, brand, image_url, price, description, is_available
            "#,
        )
        .bind(new_car.name)
        .bind(new_car.brand)
        .bind(new_car.image_url)
        .bind(new_car.price)
        .bind(new_car.description)
        .bind(new_car.is_available)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(car)
    }

    async fn update(&self, id: i64, car: NewCar) -> Result<Option<Car>, AppError> {
        let updated = sqlx::query_as::<_, Car>(
            r#"
            UPDATE cars
            SET name = $2,
                brand = $3,
                image_url = $4,
                price = $5,
                description = $6,
                is_available = $7
            WHERE id = $1
            RETURNING id, name, brand, image_url, price, description, is_available
            "#,
        )
        .bind(id)
        .bind(car.name)
        .bind(car.brand)
        .bind(car.image_url)
        .bind(car.price)
        .bind(car.description)
        .bind(car.is_available)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
