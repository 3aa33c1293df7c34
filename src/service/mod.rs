pub mod booking;
pub mod listing;
pub mod query;


pub use booking::BookingService;
pub use listing::ListingService;
pub use query::{ListFilter, QueryService, SortKey};
