pub mod actions;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use actions::{body_json, get, sign_in, SignedIn};
#[allow(unused_imports)]
pub use mocks::{FailingRevocationStore, StalledRevocationStore};
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder, ADMIN_LOGIN, ADMIN_PASSWORD};
