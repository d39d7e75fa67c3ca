use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use subtle::ConstantTimeEq;
use tracing::{debug, info, instrument, warn};

use super::{
    clock::Clock,
    errors::AuthError,
    revocation::RevocationStore,
    token::{TokenIssuer, TokenVerifier},
    types::{Claims, Credentials, TokenKind, TokenPair, ADMIN_PRINCIPAL},
};
use crate::config::AuthConfig;

/// Sign-in, verification, refresh and logout for the admin principal.
///
/// Tokens are verified statelessly; only logout and refresh rotation touch
/// the revocation store, and every store call is bounded by the configured
/// timeout. A store failure is always surfaced, never read as "not revoked".
pub struct SessionService {
    config: AuthConfig,
    issuer: TokenIssuer,
    verifier: TokenVerifier,
    revocations: Arc<dyn RevocationStore>,
    clock: Arc<dyn Clock>,
}

impl SessionService {
    pub fn new(
        config: AuthConfig,
        revocations: Arc<dyn RevocationStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let issuer = TokenIssuer::new(
            &config.hs256_secret,
            config.access_token_ttl,
            config.refresh_token_ttl,
            clock.clone(),
        );
        let verifier = TokenVerifier::new(&config.hs256_secret, clock.clone());

        Self {
            config,
            issuer,
            verifier,
            revocations,
            clock,
        }
    }

    pub fn refresh_token_ttl(&self) -> chrono::Duration {
        self.issuer.refresh_ttl()
    }

    /// Checks the credentials against the configured admin identity and issues a pair
    #[instrument(skip(self, credentials))]
    pub fn sign_in(&self, credentials: &Credentials) -> Result<TokenPair, AuthError> {
        let login_ok = credentials
            .login
            .as_bytes()
            .ct_eq(self.config.admin_login.as_bytes());
        let password_ok = credentials
            .password
            .as_bytes()
            .ct_eq(self.config.admin_password.as_bytes());

        if !bool::from(login_ok & password_ok) {
            warn!("Sign-in rejected: wrong login or password");
            return Err(AuthError::WrongLoginOrPassword);
        }

        let pair = self.issuer.issue(ADMIN_PRINCIPAL)?;
        info!("Admin signed in");
        Ok(pair)
    }

    /// Accepts an access token only if it verifies and has not been logged out
    #[instrument(skip(self, token))]
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.verifier.verify(token, TokenKind::Access)?;

        if self.is_revoked(token).await? {
            debug!("Access token was logged out");
            return Err(AuthError::AlreadyLoggedOut);
        }

        Ok(claims)
    }

    /// Exchanges a refresh token for a brand-new pair
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.verifier.verify(refresh_token, TokenKind::Refresh)?;

        if self.config.rotate_refresh_tokens {
            // The old token is revoked before the new pair exists.
            let ttl = self
                .remaining_lifetime(&claims)
                .ok_or(AuthError::Expired)?;
            if !self.revoke_once(refresh_token, ttl).await? {
                warn!("Revoked refresh token presented");
                return Err(AuthError::AlreadyLoggedOut);
            }
        }

        let pair = self.issuer.issue(&claims.principal)?;
        info!(
            rotated = self.config.rotate_refresh_tokens,
            "Token pair refreshed"
        );
        Ok(pair)
    }

    /// Revokes the access token (and the refresh token, if one is presented)
    /// for the rest of its lifetime.
    ///
    /// Logging out an already expired access token is a no-op. Logging out
    /// twice simply rewrites the revocation entry.
    #[instrument(skip(self, access_token, refresh_token))]
    pub async fn logout(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<(), AuthError> {
        match self.verifier.verify(access_token, TokenKind::Access) {
            Ok(claims) => {
                if let Some(ttl) = self.remaining_lifetime(&claims) {
                    self.revoke(access_token, ttl).await?;
                }
            }
            Err(AuthError::Expired) => {
                debug!("Access token already expired, nothing to revoke");
            }
            Err(e) => return Err(e),
        }

        if let Some(refresh_token) = refresh_token {
            match self.verifier.verify(refresh_token, TokenKind::Refresh) {
                Ok(claims) => {
                    if let Some(ttl) = self.remaining_lifetime(&claims) {
                        self.revoke(refresh_token, ttl).await?;
                    }
                }
                Err(e) => debug!(error = %e, "Ignoring unusable refresh token on logout"),
            }
        }

        info!("Admin logged out");
        Ok(())
    }

    /// Time left until the token's embedded expiry, rounded up to whole seconds
    fn remaining_lifetime(&self, claims: &Claims) -> Option<Duration> {
        let secs = claims.exp - self.clock.now().timestamp();
        (secs > 0).then(|| Duration::from_secs(secs as u64))
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, AuthError> {
        self.with_timeout(self.revocations.is_revoked(token)).await
    }

    async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), AuthError> {
        debug!(ttl_secs = ttl.as_secs(), "Revoking token");
        self.with_timeout(self.revocations.revoke(token, ttl)).await
    }

    async fn revoke_once(&self, token: &str, ttl: Duration) -> Result<bool, AuthError> {
        debug!(ttl_secs = ttl.as_secs(), "Claiming refresh token");
        self.with_timeout(self.revocations.revoke_once(token, ttl))
            .await
    }

    async fn with_timeout<T>(
        &self,
        call: impl Future<Output = Result<T, AuthError>>,
    ) -> Result<T, AuthError> {
        match tokio::time::timeout(self.config.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    timeout_ms = self.config.store_timeout.as_millis() as u64,
                    "Revocation store call timed out"
                );
                Err(AuthError::StoreTimeout)
            }
        }
    }
}
