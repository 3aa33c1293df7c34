use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::str::FromStr;
use uuid::Uuid;

use crate::auth::Identity;
use crate::constants::API_NAME;
use crate::error::AppError;
use crate::models::{Car, ListingUpdate, NewListing};
use crate::service::{ListFilter, SortKey};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cars))
        .route("/add-car", post(add_car))
        .route("/car-details/:id", get(car_details).put(update_car))
}

#[derive(Debug, Deserialize)]
struct ListParams {
    category: Option<String>,
    search: Option<String>,
    sort: Option<String>,
}

async fn list_cars(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Car>>, AppError> {
    let sort = params
        .sort
        .as_deref()
        .map(SortKey::from_str)
        .transpose()
        .map_err(AppError::InvalidInput)?;
    let filter = ListFilter {
        category: params.category,
        search: params.search,
    };
    let cars = state.queries.list_all(&filter, sort).await?;
    Ok(Json(cars))
}

async fn car_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Car>, AppError> {
    let car = state.queries.get_by_id(id).await?;
    Ok(Json(car))
}

async fn add_car(
    State(state): State<AppState>,
    identity: Identity,
    Json(details): Json<NewListing>,
) -> Result<(StatusCode, Json<Car>), AppError> {
    tracing::info!("{} Received add-car from {}", API_NAME, identity.email);
    let car = state.listings.create_listing(&identity.email, details).await?;
    Ok((StatusCode::CREATED, Json(car)))
}

async fn update_car(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(update): Json<ListingUpdate>,
) -> Result<Json<Car>, AppError> {
    let car = state.listings.update_listing(id, &identity.email, update).await?;
    Ok(Json(car))
}
