use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, patch},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Identity;
use crate::constants::API_NAME;
use crate::error::AppError;
use crate::models::{BookRequest, BookingsResponse, Car};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/car-book/:id", patch(book_car))
        .route("/my-bookings", get(my_bookings))
        .route("/my-bookings/", get(my_bookings))
        .route("/my-bookings/:id", patch(cancel_booking))
}

#[derive(Debug, Deserialize)]
struct RenterQuery {
    email: String,
}

async fn book_car(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(body): Json<BookRequest>,
) -> Result<Json<Car>, AppError> {
    // The credential is authoritative; the body field is the legacy client
    // shape and must agree with it.
    if body.booked_by != identity.email {
        return Err(AppError::Forbidden(
            "booked_by must match the authenticated user".to_string(),
        ));
    }
    tracing::info!("{} Booking request for car {} from {}", API_NAME, id, identity.email);
    let car = state.bookings.book(id, &identity.email).await?;
    Ok(Json(car))
}

async fn my_bookings(
    State(state): State<AppState>,
    Query(params): Query<RenterQuery>,
) -> Result<Json<BookingsResponse>, AppError> {
    let result = state.queries.list_bookings_by_renter(&params.email).await?;
    Ok(Json(BookingsResponse { result }))
}

async fn cancel_booking(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Car>, AppError> {
    let car = state.bookings.cancel(id, &identity.email).await?;
    Ok(Json(car))
}
