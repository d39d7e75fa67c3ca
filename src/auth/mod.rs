// Public API - what other modules can use
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::AuthError;
pub use handlers::{current_session, logout, refresh, sign_in};
pub use middleware::jwt_auth;
pub use revocation::{InMemoryRevocationStore, RedisRevocationStore, RevocationStore};
pub use service::SessionService;
pub use types::{
    AccessTokenResponse, Claims, Credentials, SessionInfo, TokenKind, TokenPair, ADMIN_PRINCIPAL,
};

pub mod cleanup_task;
pub mod clock;
mod errors;
mod handlers;
mod middleware;
pub mod revocation;
pub mod service;
pub mod token;
mod types;
