use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{clock::Clock, errors::AuthError};

/// Key-existence cache of logged-out tokens.
///
/// Entries are keyed by the raw token string and disappear on their own once
/// their TTL elapses; nothing ever deletes them explicitly.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Marks `token` as revoked for `ttl`, overwriting any existing entry
    async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), AuthError>;

    /// True iff a live entry exists for exactly this token
    async fn is_revoked(&self, token: &str) -> Result<bool, AuthError>;

    /// Revokes `token` only if no live entry exists yet, as one atomic step.
    ///
    /// Returns `true` when this call created the entry. Concurrent callers
    /// presenting the same token see exactly one `true`.
    async fn revoke_once(&self, token: &str, ttl: Duration) -> Result<bool, AuthError>;
}

/// Redis needs whole seconds and rejects a zero expiry.
fn ttl_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}

/// In-memory implementation of RevocationStore for development and testing
///
/// Expiry is measured with the injected clock so tests can move time forward.
/// Expired entries are hidden on read and dropped either lazily or by
/// `evict_expired`, which the background sweep calls periodically.
pub struct InMemoryRevocationStore {
    entries: Mutex<HashMap<String, DateTime<Utc>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRevocationStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Removes every entry whose TTL has elapsed, returning how many were dropped
    pub fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at > now);
        before - entries.len()
    }

    /// Number of stored entries, including ones not yet swept
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn expires_at(&self, ttl: Duration) -> Result<DateTime<Utc>, AuthError> {
        let ttl = chrono::Duration::from_std(ttl).map_err(|e| AuthError::Store(e.to_string()))?;
        self.clock
            .now()
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Store("revocation ttl out of range".to_string()))
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    #[instrument(skip(self, token))]
    async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), AuthError> {
        let expires_at = self.expires_at(ttl)?;

        self.lock().insert(token.to_string(), expires_at);

        debug!(expires_at = %expires_at, "Token revoked in memory");
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn is_revoked(&self, token: &str) -> Result<bool, AuthError> {
        let now = self.clock.now();
        let mut entries = self.lock();

        match entries.get(token) {
            Some(expires_at) if *expires_at > now => Ok(true),
            Some(_) => {
                entries.remove(token);
                debug!("Revocation entry expired, dropped from memory");
                Ok(false)
            }
            None => Ok(false),
        }
    }

    #[instrument(skip(self, token))]
    async fn revoke_once(&self, token: &str, ttl: Duration) -> Result<bool, AuthError> {
        let expires_at = self.expires_at(ttl)?;
        let now = self.clock.now();
        let mut entries = self.lock();

        if entries.get(token).is_some_and(|existing| *existing > now) {
            debug!("Token already revoked in memory");
            return Ok(false);
        }

        entries.insert(token.to_string(), expires_at);
        debug!(expires_at = %expires_at, "Token revoked in memory");
        Ok(true)
    }
}

/// Redis implementation of RevocationStore
///
/// Uses `SET .. EX` so Redis owns expiry, `SET .. NX EX` for the one-shot
/// claim on refresh, and `EXISTS` for the check.
#[derive(Clone)]
pub struct RedisRevocationStore {
    redis: ConnectionManager,
}

impl RedisRevocationStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    /// Opens a managed connection to `url`
    pub async fn connect(url: &str) -> Result<Self, AuthError> {
        let client = redis::Client::open(url)?;
        let redis = ConnectionManager::new(client).await?;
        Ok(Self::new(redis))
    }
}

fn set_command(token: &str, seconds: u64, only_if_absent: bool) -> redis::Cmd {
    let mut cmd = redis::cmd("SET");
    cmd.arg(token).arg(1);
    if only_if_absent {
        cmd.arg("NX");
    }
    cmd.arg("EX").arg(seconds);
    cmd
}

fn exists_command(token: &str) -> redis::Cmd {
    let mut cmd = redis::cmd("EXISTS");
    cmd.arg(token);
    cmd
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    #[instrument(skip(self, token))]
    async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), AuthError> {
        let seconds = ttl_seconds(ttl);
        let mut conn = self.redis.clone();

        let _: () = set_command(token, seconds, false)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to write revocation entry to redis");
                AuthError::from(e)
            })?;

        debug!(ttl_secs = seconds, "Token revoked in redis");
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn is_revoked(&self, token: &str) -> Result<bool, AuthError> {
        let mut conn = self.redis.clone();

        let exists: bool = exists_command(token)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to read revocation entry from redis");
                AuthError::from(e)
            })?;

        Ok(exists)
    }

    #[instrument(skip(self, token))]
    async fn revoke_once(&self, token: &str, ttl: Duration) -> Result<bool, AuthError> {
        let seconds = ttl_seconds(ttl);
        let mut conn = self.redis.clone();

        // NX replies nil when the key already exists.
        let reply: Option<String> = set_command(token, seconds, true)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to claim revocation entry in redis");
                AuthError::from(e)
            })?;

        let created = reply.is_some();
        debug!(ttl_secs = seconds, created, "Token claimed in redis");
        Ok(created)
    }
}
