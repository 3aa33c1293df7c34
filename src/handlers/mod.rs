pub mod bookings;
pub mod cars;
pub mod health;
pub mod listings;

use axum::Router;

use crate::state::AppState;

/// The full route table the client depends on.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(cars::router())
        .merge(listings::router())
        .merge(bookings::router())
        .merge(health::router())
}
