pub mod args;
pub mod auth;
pub mod context;
pub mod cors;
pub mod db;
pub mod error;
pub mod models;
pub mod order;
pub mod product;
pub mod reqres;
pub mod user;
pub mod utils;

pub const APP_NAME: &str = "storefront";

// Document id prefixes
pub const USER_DB_KEY:      &str = "u";
pub const PRODUCT_DB_KEY:   &str = "p";
pub const ORDER_DB_KEY:     &str = "o";
// End document id prefixes

// Collections
pub const USER_COLLECTION:      &str = "users";
pub const PRODUCT_COLLECTION:   &str = "products";
pub const ORDER_COLLECTION:     &str = "orders";
// End collections

/// Allowed origin when `CORS_ORIGIN` is not set
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
/// Longest accepted `TOKEN_TIMEOUT`, one year in minutes
pub const MAX_TOKEN_TIMEOUT: i64 = 525_600;
/// Default app port
pub const DEFAULT_APP_PORT: u16 = 5000;
/// Database used when neither the connection string nor the config names one
pub const DEFAULT_DB_NAME: &str = "storefront";
/// Fixed response for a bearer token that fails verification
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid token, please login again";
/// Response for a protected route reached without identity
pub const LOGIN_REQUIRED_MESSAGE: &str = "Not authorized, please login";
/// Response for an admin route reached by a customer
pub const ADMIN_REQUIRED_MESSAGE: &str = "Admin access required";
/// Response for a rejected cross-origin request
pub const CORS_REJECTED_MESSAGE: &str = "Not allowed by CORS";
/// Internal mount point for requests rewritten by the gates
pub const GATE_BASE: &str = "/gate";
