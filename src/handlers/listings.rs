use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    routing::patch,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::Identity;
use crate::error::AppError;
use crate::models::{Car, StatusChangeRequest};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        // The client requests "/mylisting/?email=..."; cover both spellings.
        .route("/mylisting", get(my_listings))
        .route("/mylisting/", get(my_listings))
        .route("/mylisting/:id", patch(change_status).delete(delete_listing))
}

#[derive(Debug, Deserialize)]
struct OwnerQuery {
    email: String,
}

async fn my_listings(
    State(state): State<AppState>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<Vec<Car>>, AppError> {
    let cars = state.queries.list_by_owner(&params.email).await?;
    Ok(Json(cars))
}

async fn change_status(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusChangeRequest>,
) -> Result<Json<Car>, AppError> {
    let car = state
        .listings
        .set_maintenance_status(id, &identity.email, body.new_status)
        .await?;
    Ok(Json(car))
}

async fn delete_listing(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.listings.delete_listing(id, &identity.email).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Listing deleted successfully"
    })))
}
