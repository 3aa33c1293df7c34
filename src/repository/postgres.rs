use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{CarStore, Transition};
use crate::error::AppError;
use crate::models::{Car, CarStatus, ListingUpdate};

const CAR_COLUMNS: &str = "id, owner_email, car_name, category, year, price_per_day, description, \
     image_url, location, transmission, fuel_type, seats, doors, status, booked_by, created_at, updated_at";

/// Raw `cars` row. Status is TEXT in the database and normalized into the
/// domain enum on the way out.
#[derive(Debug, FromRow)]
struct CarRow {
    id: Uuid,
    owner_email: String,
    car_name: String,
    category: String,
    year: i32,
    price_per_day: f64,
    description: String,
    image_url: String,
    location: String,
    transmission: String,
    fuel_type: String,
    seats: i32,
    doors: i32,
    status: String,
    booked_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CarRow> for Car {
    type Error = anyhow::Error;

    fn try_from(row: CarRow) -> Result<Self, Self::Error> {
        let status: CarStatus = row
            .status
            .parse()
            .map_err(|e: String| anyhow::anyhow!("corrupt status in row {}: {}", row.id, e))?;
        Ok(Car {
            id: row.id,
            owner_email: row.owner_email,
            car_name: row.car_name,
            category: row.category,
            year: row.year,
            price_per_day: row.price_per_day,
            description: row.description,
            image_url: row.image_url,
            location: row.location,
            transmission: row.transmission,
            fuel_type: row.fuel_type,
            seats: row.seats,
            doors: row.doors,
            status,
            booked_by: row.booked_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgCarStore {
    pool: PgPool,
}

impl PgCarStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM cars WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Turns the result of a conditional update into a Transition,
    /// re-checking existence to tell Conflict from NotFound.
    async fn transition_from(&self, id: Uuid, row: Option<CarRow>) -> Result<Transition, AppError> {
        match row {
            Some(row) => Ok(Transition::Committed(row.try_into().map_err(AppError::Internal)?)),
            None if self.exists(id).await? => Ok(Transition::Conflict),
            None => Ok(Transition::NotFound),
        }
    }
}

#[async_trait]
impl CarStore for PgCarStore {
    async fn insert(&self, car: &Car) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO cars (id, owner_email, car_name, category, year, price_per_day, description, \
             image_url, location, transmission, fuel_type, seats, doors, status, booked_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
        )
        .bind(car.id)
        .bind(&car.owner_email)
        .bind(&car.car_name)
        .bind(&car.category)
        .bind(car.year)
        .bind(car.price_per_day)
        .bind(&car.description)
        .bind(&car.image_url)
        .bind(&car.location)
        .bind(&car.transmission)
        .bind(&car.fuel_type)
        .bind(car.seats)
        .bind(car.doors)
        .bind(car.status.as_str())
        .bind(&car.booked_by)
        .bind(car.created_at)
        .bind(car.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Car>, AppError> {
        let row = sqlx::query_as::<_, CarRow>(&format!("SELECT {} FROM cars WHERE id = $1", CAR_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| r.try_into().map_err(AppError::Internal)).transpose()
    }

    async fn list(&self) -> Result<Vec<Car>, AppError> {
        let rows = sqlx::query_as::<_, CarRow>(&format!(
            "SELECT {} FROM cars ORDER BY created_at ASC, id ASC",
            CAR_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|r| r.try_into().map_err(AppError::Internal))
            .collect()
    }

    async fn update_details(&self, id: Uuid, update: &ListingUpdate) -> Result<Option<Car>, AppError> {
        let row = sqlx::query_as::<_, CarRow>(&format!(
            "UPDATE cars SET \
                 car_name = COALESCE($2, car_name), \
                 category = COALESCE($3, category), \
                 year = COALESCE($4, year), \
                 price_per_day = COALESCE($5, price_per_day), \
                 description = COALESCE($6, description), \
                 image_url = COALESCE($7, image_url), \
                 location = COALESCE($8, location), \
                 transmission = COALESCE($9, transmission), \
                 fuel_type = COALESCE($10, fuel_type), \
                 seats = COALESCE($11, seats), \
                 doors = COALESCE($12, doors), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            CAR_COLUMNS
        ))
        .bind(id)
        .bind(&update.car_name)
        .bind(&update.category)
        .bind(update.year)
        .bind(update.price_per_day)
        .bind(&update.description)
        .bind(&update.image_url)
        .bind(&update.location)
        .bind(&update.transmission)
        .bind(&update.fuel_type)
        .bind(update.seats)
        .bind(update.doors)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| r.try_into().map_err(AppError::Internal)).transpose()
    }

    async fn book_if_available(&self, id: Uuid, renter: &str) -> Result<Transition, AppError> {
        let row = sqlx::query_as::<_, CarRow>(&format!(
            "UPDATE cars SET status = 'Booked', booked_by = $2, updated_at = NOW() \
             WHERE id = $1 AND status = 'Available' RETURNING {}",
            CAR_COLUMNS
        ))
        .bind(id)
        .bind(renter)
        .fetch_optional(&self.pool)
        .await?;
        self.transition_from(id, row).await
    }

    async fn release_booking(&self, id: Uuid, renter: &str) -> Result<Transition, AppError> {
        let row = sqlx::query_as::<_, CarRow>(&format!(
            "UPDATE cars SET status = 'Available', booked_by = NULL, updated_at = NOW() \
             WHERE id = $1 AND status = 'Booked' AND booked_by = $2 RETURNING {}",
            CAR_COLUMNS
        ))
        .bind(id)
        .bind(renter)
        .fetch_optional(&self.pool)
        .await?;
        self.transition_from(id, row).await
    }

    async fn hold_if_available(&self, id: Uuid) -> Result<Transition, AppError> {
        let row = sqlx::query_as::<_, CarRow>(&format!(
            "UPDATE cars SET status = 'Booked', updated_at = NOW() \
             WHERE id = $1 AND status = 'Available' RETURNING {}",
            CAR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        self.transition_from(id, row).await
    }

    async fn release_if_unrented(&self, id: Uuid) -> Result<Transition, AppError> {
        let row = sqlx::query_as::<_, CarRow>(&format!(
            "UPDATE cars SET status = 'Available', updated_at = NOW() \
             WHERE id = $1 AND status = 'Booked' AND booked_by IS NULL RETURNING {}",
            CAR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        self.transition_from(id, row).await
    }

    async fn delete_if_available(&self, id: Uuid) -> Result<Transition, AppError> {
        let row = sqlx::query_as::<_, CarRow>(&format!(
            "DELETE FROM cars WHERE id = $1 AND status = 'Available' RETURNING {}",
            CAR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        self.transition_from(id, row).await
    }
}
