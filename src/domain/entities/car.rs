//! Car entity representing one inventory item.

use serde::Serialize;

/// A car in the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Car {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub image_url: String,
    pub price: i64,
    pub description: String,
    pub is_available: bool,
}

/// Input data for creating or replacing a car.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCar {
    pub name: String,
    pub brand: String,
    pub image_url: String,
    pub price: i64,
    pub description: String,
    pub is_available: bool,
}

impl Car {
    /// Builds the stored car from its id and the submitted fields.
    pub fn from_new(id: i64, new_car: NewCar) -> Self {
        Self {
            id,
            name: new_car.name,
            brand: new_car.brand,
            image_url: new_car.image_url,
            price: new_car.price,
            description: new_car.description,
            is_available: new_car.is_available,
        }
    }
}
