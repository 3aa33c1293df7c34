mod memory;
mod postgres;

pub use memory::InMemoryCarStore;
pub use postgres::PgCarStore;

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Car, ListingUpdate};

pub type DynCarStore = Arc<dyn CarStore>;

/// Outcome of a conditional state transition on a car row.
#[derive(Debug, Clone)]
pub enum Transition {
    /// The transition committed; carries the row as it looked afterwards
    /// (or as deleted, for deletes).
    Committed(Car),
    /// The row exists but was not in the required state.
    Conflict,
    NotFound,
}

/// Storage contract for car listings.
///
/// Every status/booked_by mutation is a single conditional update keyed on
/// the current state, never a read followed by a write: two concurrent
/// bookings of the same Available car must commit exactly once.
#[async_trait]
pub trait CarStore: Send + Sync {
    async fn insert(&self, car: &Car) -> Result<(), AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Car>, AppError>;

    /// All cars in insertion order.
    async fn list(&self) -> Result<Vec<Car>, AppError>;

    /// Merges descriptive fields; status and booked_by are untouched.
    /// Returns None when the row is absent.
    async fn update_details(&self, id: Uuid, update: &ListingUpdate) -> Result<Option<Car>, AppError>;

    /// Atomic Available -> Booked, recording the renter.
    async fn book_if_available(&self, id: Uuid, renter: &str) -> Result<Transition, AppError>;

    /// Atomic Booked -> Available, but only while `renter` still holds the
    /// car. Clears booked_by.
    async fn release_booking(&self, id: Uuid, renter: &str) -> Result<Transition, AppError>;

    /// Atomic Available -> Booked with no renter recorded (owner taking the
    /// car offline).
    async fn hold_if_available(&self, id: Uuid) -> Result<Transition, AppError>;

    /// Atomic Booked -> Available, but only while no renter holds the car.
    async fn release_if_unrented(&self, id: Uuid) -> Result<Transition, AppError>;

    /// Deletes the row only while it is Available.
    async fn delete_if_available(&self, id: Uuid) -> Result<Transition, AppError>;
}
