use crate::auth::IdentityGate;
use crate::repository::DynCarStore;
use crate::service::{BookingService, ListingService, QueryService};

#[derive(Clone)]
pub struct AppState {
    pub listings: ListingService,
    pub bookings: BookingService,
    pub queries: QueryService,
    pub gate: IdentityGate,
}

impl AppState {
    pub fn new(store: DynCarStore, gate: IdentityGate) -> Self {
        Self {
            listings: ListingService::new(store.clone()),
            bookings: BookingService::new(store.clone()),
            queries: QueryService::new(store),
            gate,
        }
    }
}
