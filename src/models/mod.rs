pub mod car;
pub mod requests;

pub use car::{Car, CarStatus};
pub use requests::{BookRequest, BookingsResponse, ListingUpdate, NewListing, StatusChangeRequest};
