pub const API_NAME: &str = "[CarRentalApi]";

pub const JWT_ISSUER: &str = "car-rental-api";
pub const TOKEN_TTL_HOURS: i64 = 24;
