use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use uuid::Uuid;

use super::{CarStore, Transition};
use crate::error::AppError;
use crate::models::{Car, CarStatus, ListingUpdate};

/// Mutex-backed store with the same conditional-update semantics as the
/// Postgres implementation. Used by the test suite and for local runs
/// without a database; the single lock gives every transition the required
/// atomicity.
#[derive(Default)]
pub struct InMemoryCarStore {
    // Vec keeps insertion order, which the query layer relies on for
    // stable listing output.
    cars: Mutex<Vec<Car>>,
}

impl InMemoryCarStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn transition<F>(&self, id: Uuid, apply: F) -> Transition
    where
        F: FnOnce(&mut Car) -> bool,
    {
        let mut cars = self.cars.lock().unwrap_or_else(|e| e.into_inner());
        match cars.iter_mut().find(|c| c.id == id) {
            Some(car) => {
                if apply(car) {
                    car.updated_at = Utc::now();
                    Transition::Committed(car.clone())
                } else {
                    Transition::Conflict
                }
            }
            None => Transition::NotFound,
        }
    }
}

#[async_trait]
impl CarStore for InMemoryCarStore {
    async fn insert(&self, car: &Car) -> Result<(), AppError> {
        let mut cars = self.cars.lock().unwrap_or_else(|e| e.into_inner());
        cars.push(car.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Car>, AppError> {
        let cars = self.cars.lock().unwrap_or_else(|e| e.into_inner());
        Ok(cars.iter().find(|c| c.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Car>, AppError> {
        let cars = self.cars.lock().unwrap_or_else(|e| e.into_inner());
        Ok(cars.clone())
    }

    async fn update_details(&self, id: Uuid, update: &ListingUpdate) -> Result<Option<Car>, AppError> {
        let mut cars = self.cars.lock().unwrap_or_else(|e| e.into_inner());
        Ok(cars.iter_mut().find(|c| c.id == id).map(|car| {
            update.apply(car);
            car.updated_at = Utc::now();
            car.clone()
        }))
    }

    async fn book_if_available(&self, id: Uuid, renter: &str) -> Result<Transition, AppError> {
        Ok(self.transition(id, |car| {
            if car.status == CarStatus::Available {
                car.status = CarStatus::Booked;
                car.booked_by = Some(renter.to_string());
                true
            } else {
                false
            }
        }))
    }

    async fn release_booking(&self, id: Uuid, renter: &str) -> Result<Transition, AppError> {
        Ok(self.transition(id, |car| {
            if car.status == CarStatus::Booked && car.booked_by.as_deref() == Some(renter) {
                car.status = CarStatus::Available;
                car.booked_by = None;
                true
            } else {
                false
            }
        }))
    }

    async fn hold_if_available(&self, id: Uuid) -> Result<Transition, AppError> {
        Ok(self.transition(id, |car| {
            if car.status == CarStatus::Available {
                car.status = CarStatus::Booked;
                true
            } else {
                false
            }
        }))
    }

    async fn release_if_unrented(&self, id: Uuid) -> Result<Transition, AppError> {
        Ok(self.transition(id, |car| {
            if car.status == CarStatus::Booked && car.booked_by.is_none() {
                car.status = CarStatus::Available;
                true
            } else {
                false
            }
        }))
    }

    async fn delete_if_available(&self, id: Uuid) -> Result<Transition, AppError> {
        let mut cars = self.cars.lock().unwrap_or_else(|e| e.into_inner());
        match cars.iter().position(|c| c.id == id) {
            Some(idx) if cars[idx].status == CarStatus::Available => {
                Ok(Transition::Committed(cars.remove(idx)))
            }
            Some(_) => Ok(Transition::Conflict),
            None => Ok(Transition::NotFound),
        }
    }
}
