use uuid::Uuid;
use validator::Validate;

use crate::constants::API_NAME;
use crate::error::AppError;
use crate::models::{Car, CarStatus, ListingUpdate, NewListing};
use crate::repository::{DynCarStore, Transition};

/// Owns listing CRUD and the owner's manual status toggle. Renter-driven
/// transitions live in the booking service.
#[derive(Clone)]
pub struct ListingService {
    store: DynCarStore,
}

impl ListingService {
    pub fn new(store: DynCarStore) -> Self {
        Self { store }
    }

    pub async fn create_listing(&self, owner_email: &str, details: NewListing) -> Result<Car, AppError> {
        details
            .validate()
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;
        if details.price_per_day <= 0.0 {
            return Err(AppError::InvalidInput("price_per_day must be positive".to_string()));
        }

        let car = Car::new(owner_email, details);
        self.store.insert(&car).await?;
        tracing::info!("{} Created listing {} for {}", API_NAME, car.id, car.owner_email);
        Ok(car)
    }

    pub async fn update_listing(
        &self,
        id: Uuid,
        owner_email: &str,
        update: ListingUpdate,
    ) -> Result<Car, AppError> {
        update
            .validate()
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;
        if let Some(price) = update.price_per_day {
            if price <= 0.0 {
                return Err(AppError::InvalidInput("price_per_day must be positive".to_string()));
            }
        }
        if let Some(name) = &update.car_name {
            if name.is_empty() {
                return Err(AppError::InvalidInput("car_name cannot be empty".to_string()));
            }
        }

        self.require_owner(id, owner_email).await?;

        let updated = self
            .store
            .update_details(id, &update)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no car with id {}", id)))?;
        tracing::info!("{} Updated listing {}", API_NAME, id);
        Ok(updated)
    }

    pub async fn delete_listing(&self, id: Uuid, owner_email: &str) -> Result<Car, AppError> {
        self.require_owner(id, owner_email).await?;

        match self.store.delete_if_available(id).await? {
            Transition::Committed(car) => {
                tracing::info!("{} Deleted listing {}", API_NAME, id);
                Ok(car)
            }
            Transition::Conflict => Err(AppError::Conflict(
                "cannot delete a booked car; cancel the active booking first".to_string(),
            )),
            Transition::NotFound => Err(AppError::NotFound(format!("no car with id {}", id))),
        }
    }

    /// Owner-only toggle used outside the renter booking flow. Taking the
    /// car offline marks it Booked without a renter; bringing it back only
    /// works while no renter holds it.
    pub async fn set_maintenance_status(
        &self,
        id: Uuid,
        owner_email: &str,
        desired: CarStatus,
    ) -> Result<Car, AppError> {
        self.require_owner(id, owner_email).await?;

        let outcome = match desired {
            CarStatus::Booked => self.store.hold_if_available(id).await?,
            CarStatus::Available => self.store.release_if_unrented(id).await?,
        };

        match outcome {
            Transition::Committed(car) => {
                tracing::info!("{} Listing {} marked {} by owner", API_NAME, id, desired);
                Ok(car)
            }
            Transition::Conflict => match desired {
                CarStatus::Booked => Err(AppError::Conflict("car is already booked".to_string())),
                CarStatus::Available => Err(AppError::Conflict(
                    "car is held by an active booking; cancel it instead".to_string(),
                )),
            },
            Transition::NotFound => Err(AppError::NotFound(format!("no car with id {}", id))),
        }
    }

    // owner_email is immutable, so a read-then-check is race-free here.
    async fn require_owner(&self, id: Uuid, owner_email: &str) -> Result<Car, AppError> {
        let car = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no car with id {}", id)))?;
        if car.owner_email != owner_email {
            return Err(AppError::Forbidden(
                "only the owner of this listing may modify it".to_string(),
            ));
        }
        Ok(car)
    }
}
