use axum::Router;
use chrono::{TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;

use coupon_admin::auth::{InMemoryRevocationStore, ManualClock, RevocationStore};
use coupon_admin::{build_router, AppState, AuthConfig, CookieConfig, SessionService};

pub const ADMIN_LOGIN: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct-horse";
const SECRET: &str = "integration-secret";

/// Everything a workflow test needs: the router plus handles on time and storage
pub struct TestSetup {
    pub app: Router,
    pub clock: Arc<ManualClock>,
    pub memory_store: Arc<InMemoryRevocationStore>,
}

pub struct TestSetupBuilder {
    store: Option<Arc<dyn RevocationStore>>,
    rotate_refresh_tokens: bool,
    store_timeout: Duration,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            rotate_refresh_tokens: true,
            store_timeout: Duration::from_millis(200),
        }
    }

    /// Replaces the in-memory revocation store used by the service
    pub fn with_store(mut self, store: Arc<dyn RevocationStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn without_refresh_rotation(mut self) -> Self {
        self.rotate_refresh_tokens = false;
        self
    }

    pub fn build(self) -> TestSetup {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        ));
        let memory_store = Arc::new(InMemoryRevocationStore::new(clock.clone()));
        let store = self
            .store
            .unwrap_or_else(|| memory_store.clone() as Arc<dyn RevocationStore>);

        let mut config = AuthConfig::new(ADMIN_LOGIN, ADMIN_PASSWORD, SECRET);
        config.rotate_refresh_tokens = self.rotate_refresh_tokens;
        config.store_timeout = self.store_timeout;

        let service = SessionService::new(config, store, clock.clone());
        let state = AppState::new(Arc::new(service), CookieConfig::default());

        TestSetup {
            app: build_router(state),
            clock,
            memory_store,
        }
    }
}

impl Default for TestSetupBuilder {
    fn default() -> Self {
        Self::new()
    }
}
