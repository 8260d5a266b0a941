//! DTOs for car inventory endpoints.

use serde::Deserialize;
use validator::Validate;

use crate::domain::entities::NewCar;

/// Body of `POST /api/cars/create` and `PUT /api/cars/update/{id}`.
///
/// An `id` field in the body is ignored; the path id wins.
#[derive(Debug, Deserialize, Validate)]
pub struct CarPayload {
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub name: String,

    #[validate(length(min = 1, max = 255, message = "brand must not be empty"))]
    pub brand: String,

    #[validate(url(message = "Invalid URL format"))]
    pub image_url: String,

    #[validate(range(min = 0, message = "price must not be negative"))]
    pub price: i64,

    #[serde(default)]
    pub description: String,

    #[serde(default = "available_by_default")]
    pub is_available: bool,
}

fn available_by_default() -> bool {
    true
}

impl From<CarPayload> for NewCar {
    fn from(p: CarPayload) -> Self {
        NewCar {
            name: p.name,
            brand: p.brand,
            image_url: p.image_url,
            price: p.price,
            description: p.description,
            is_available: p.is_available,
        }
    }
}
