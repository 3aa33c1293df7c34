use serde::{Deserialize, Serialize};
use validator::Validate;

use super::car::{Car, CarStatus};

/// Body of `POST /add-car`. Field names match the form the client submits.
/// The owner identity comes from the bearer credential, never from the body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewListing {
    #[validate(length(min = 1, message = "car_name is required"))]
    pub car_name: String,
    #[serde(default)]
    pub category: String,
    pub year: i32,
    pub price_per_day: f64,
    #[serde(default)]
    pub description: String,
    #[validate(url(message = "image_url must be a valid URL"))]
    pub image_url: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub transmission: String,
    #[serde(default)]
    pub fuel_type: String,
    #[serde(default)]
    pub seats: i32,
    #[serde(default)]
    pub doors: i32,
}

/// Body of `PUT /car-details/{id}`. Absent fields are left untouched.
/// Status and booked_by are deliberately not here; those transitions go
/// through the booking endpoints.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListingUpdate {
    pub car_name: Option<String>,
    pub category: Option<String>,
    pub year: Option<i32>,
    pub price_per_day: Option<f64>,
    pub description: Option<String>,
    #[validate(url(message = "image_url must be a valid URL"))]
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,
    pub seats: Option<i32>,
    pub doors: Option<i32>,
}

impl ListingUpdate {
    /// Merges the provided fields into a car record.
    pub fn apply(&self, car: &mut Car) {
        if let Some(v) = &self.car_name {
            car.car_name = v.clone();
        }
        if let Some(v) = &self.category {
            car.category = v.clone();
        }
        if let Some(v) = self.year {
            car.year = v;
        }
        if let Some(v) = self.price_per_day {
            car.price_per_day = v;
        }
        if let Some(v) = &self.description {
            car.description = v.clone();
        }
        if let Some(v) = &self.image_url {
            car.image_url = v.clone();
        }
        if let Some(v) = &self.location {
            car.location = v.clone();
        }
        if let Some(v) = &self.transmission {
            car.transmission = v.clone();
        }
        if let Some(v) = &self.fuel_type {
            car.fuel_type = v.clone();
        }
        if let Some(v) = self.seats {
            car.seats = v;
        }
        if let Some(v) = self.doors {
            car.doors = v;
        }
    }
}

/// Body of `PATCH /car-book/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct BookRequest {
    pub booked_by: String,
}

/// Body of `PATCH /mylisting/{id}`. The key is camelCase in the client.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusChangeRequest {
    #[serde(rename = "newStatus")]
    pub new_status: CarStatus,
}

/// Response shape of `GET /my-bookings/`.
#[derive(Debug, Serialize)]
pub struct BookingsResponse {
    pub result: Vec<Car>,
}
