// Library crate for the coupon platform admin backend
// This file exposes the public API for integration tests

pub mod auth;
pub mod config;
pub mod routes;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use auth::{AuthError, SessionService};
pub use config::{AuthConfig, Config, CookieConfig};
pub use routes::build_router;
pub use shared::{AppError, AppState};
