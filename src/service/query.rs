use std::cmp::Ordering;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Car;
use crate::repository::DynCarStore;

/// Sort keys accepted by the listing endpoint. Wire values match the
/// client's dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    PriceLow,
    PriceHigh,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortKey::Name),
            "price-low" => Ok(SortKey::PriceLow),
            "price-high" => Ok(SortKey::PriceHigh),
            other => Err(format!("unknown sort key: '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive substring match on the car name.
    pub search: Option<String>,
}

/// Read-only views over the car table. Never mutates state; sorting is
/// stable so equal keys keep their insertion order across requests.
#[derive(Clone)]
pub struct QueryService {
    store: DynCarStore,
}

impl QueryService {
    pub fn new(store: DynCarStore) -> Self {
        Self { store }
    }

    pub async fn list_all(&self, filter: &ListFilter, sort: Option<SortKey>) -> Result<Vec<Car>, AppError> {
        let mut cars = self.store.list().await?;

        if let Some(category) = &filter.category {
            cars.retain(|c| &c.category == category);
        }
        if let Some(term) = &filter.search {
            let needle = term.to_lowercase();
            cars.retain(|c| c.car_name.to_lowercase().contains(&needle));
        }

        // Vec::sort_by is stable, which keeps ties in insertion order.
        match sort {
            Some(SortKey::Name) => cars.sort_by(|a, b| a.car_name.cmp(&b.car_name)),
            Some(SortKey::PriceLow) => cars.sort_by(|a, b| compare_price(a, b)),
            Some(SortKey::PriceHigh) => cars.sort_by(|a, b| compare_price(b, a)),
            None => {}
        }

        Ok(cars)
    }

    pub async fn list_by_owner(&self, owner_email: &str) -> Result<Vec<Car>, AppError> {
        let mut cars = self.store.list().await?;
        cars.retain(|c| c.owner_email == owner_email);
        Ok(cars)
    }

    pub async fn list_bookings_by_renter(&self, renter_email: &str) -> Result<Vec<Car>, AppError> {
        let mut cars = self.store.list().await?;
        cars.retain(|c| c.booked_by.as_deref() == Some(renter_email));
        Ok(cars)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Car, AppError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no car with id {}", id)))
    }
}

fn compare_price(a: &Car, b: &Car) -> Ordering {
    a.price_per_day
        .partial_cmp(&b.price_per_day)
        .unwrap_or(Ordering::Equal)
}
