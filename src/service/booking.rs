use uuid::Uuid;

use crate::constants::API_NAME;
use crate::error::AppError;
use crate::models::{Car, CarStatus};
use crate::repository::{DynCarStore, Transition};

/// Drives the per-car state machine:
/// `Available --book(renter)--> Booked --cancel--> Available`.
/// No other transitions exist; both legs are atomic compare-and-sets in the
/// store, so a lost race surfaces as Conflict, never a silent overwrite.
#[derive(Clone)]
pub struct BookingService {
    store: DynCarStore,
}

impl BookingService {
    pub fn new(store: DynCarStore) -> Self {
        Self { store }
    }

    pub async fn book(&self, car_id: Uuid, renter_email: &str) -> Result<Car, AppError> {
        let car = self
            .store
            .get(car_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no car with id {}", car_id)))?;
        if car.owner_email == renter_email {
            return Err(AppError::Conflict("owners cannot book their own car".to_string()));
        }

        match self.store.book_if_available(car_id, renter_email).await? {
            Transition::Committed(car) => {
                tracing::info!("{} Car {} booked by {}", API_NAME, car_id, renter_email);
                Ok(car)
            }
            Transition::Conflict => Err(AppError::Conflict("car is no longer available".to_string())),
            Transition::NotFound => Err(AppError::NotFound(format!("no car with id {}", car_id))),
        }
    }

    /// Both the renter and the listing owner may cancel an active booking.
    pub async fn cancel(&self, car_id: Uuid, caller_email: &str) -> Result<Car, AppError> {
        let car = self
            .store
            .get(car_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no car with id {}", car_id)))?;

        if car.status != CarStatus::Booked {
            return Err(AppError::Conflict("no active booking to cancel".to_string()));
        }
        let renter = car.booked_by.clone().ok_or_else(|| {
            // Owner hold, not a renter booking.
            AppError::Conflict("car is offline for maintenance, not booked".to_string())
        })?;
        if caller_email != renter && caller_email != car.owner_email {
            return Err(AppError::Forbidden(
                "only the renter or the listing owner may cancel this booking".to_string(),
            ));
        }

        // Keyed on the renter observed above: if the booking turned over in
        // between, the release misses and reports Conflict.
        match self.store.release_booking(car_id, &renter).await? {
            Transition::Committed(car) => {
                tracing::info!("{} Booking on car {} cancelled by {}", API_NAME, car_id, caller_email);
                Ok(car)
            }
            Transition::Conflict => Err(AppError::Conflict("booking already ended".to_string())),
            Transition::NotFound => Err(AppError::NotFound(format!("no car with id {}", car_id))),
        }
    }
}
