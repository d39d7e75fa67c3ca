use async_trait::async_trait;
use std::time::Duration;

use coupon_admin::auth::RevocationStore;
use coupon_admin::AuthError;

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Store whose backend is unreachable
pub struct FailingRevocationStore;

#[async_trait]
impl RevocationStore for FailingRevocationStore {
    async fn revoke(&self, _token: &str, _ttl: Duration) -> Result<(), AuthError> {
        Err(AuthError::Store("connection refused".to_string()))
    }

    async fn is_revoked(&self, _token: &str) -> Result<bool, AuthError> {
        Err(AuthError::Store("connection refused".to_string()))
    }

    async fn revoke_once(&self, _token: &str, _ttl: Duration) -> Result<bool, AuthError> {
        Err(AuthError::Store("connection refused".to_string()))
    }
}

/// Store that accepts the call and never answers
pub struct StalledRevocationStore;

#[async_trait]
impl RevocationStore for StalledRevocationStore {
    async fn revoke(&self, _token: &str, _ttl: Duration) -> Result<(), AuthError> {
        std::future::pending().await
    }

    async fn is_revoked(&self, _token: &str) -> Result<bool, AuthError> {
        std::future::pending().await
    }

    async fn revoke_once(&self, _token: &str, _ttl: Duration) -> Result<bool, AuthError> {
        std::future::pending().await
    }
}
