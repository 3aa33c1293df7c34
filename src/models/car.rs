use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::requests::NewListing;

/// Booking eligibility of a listing. Serialized canonically as
/// `"Available"` / `"Booked"`; parsing is case-insensitive because the
/// clients in the wild disagree on casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CarStatus {
    Available,
    Booked,
}

impl CarStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarStatus::Available => "Available",
            CarStatus::Booked => "Booked",
        }
    }
}

impl fmt::Display for CarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CarStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(CarStatus::Available),
            "booked" => Ok(CarStatus::Booked),
            other => Err(format!("unknown car status: '{}'", other)),
        }
    }
}

impl<'de> Deserialize<'de> for CarStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Car {
    pub id: Uuid,
    pub owner_email: String,
    pub car_name: String,
    pub category: String,
    pub year: i32,
    pub price_per_day: f64,
    pub description: String,
    pub image_url: String,
    pub location: String,
    pub transmission: String,
    pub fuel_type: String,
    pub seats: i32,
    pub doors: i32,
    pub status: CarStatus,
    /// Renter currently holding the car. None whenever the car is Available;
    /// also None while the owner has taken the car offline.
    pub booked_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Car {
    pub fn new(owner_email: &str, details: NewListing) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_email: owner_email.to_string(),
            car_name: details.car_name,
            category: details.category,
            year: details.year,
            price_per_day: details.price_per_day,
            description: details.description,
            image_url: details.image_url,
            location: details.location,
            transmission: details.transmission,
            fuel_type: details.fuel_type,
            seats: details.seats,
            doors: details.doors,
            status: CarStatus::Available,
            booked_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}
