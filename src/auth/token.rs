use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{
    clock::Clock,
    errors::AuthError,
    types::{Claims, TokenKind, TokenPair, ADMIN_PRINCIPAL},
};

/// Mints signed access/refresh pairs.
///
/// Both tokens of a pair share the secret and signing scheme and differ only
/// in their `kind` claim and absolute expiry.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(
        secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
            clock,
        }
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Issues a new pair for `principal`, which must be the admin principal
    #[instrument(skip(self))]
    pub fn issue(&self, principal: &str) -> Result<TokenPair, AuthError> {
        if principal != ADMIN_PRINCIPAL {
            debug!("Refusing to issue tokens for unknown principal type");
            return Err(AuthError::UnknownPrincipalType);
        }

        let now = self.clock.now();
        let access_expires_at = expiry(now, self.access_ttl)?;
        let refresh_expires_at = expiry(now, self.refresh_ttl)?;

        let access_token = self.sign(principal, TokenKind::Access, now, access_expires_at)?;
        let refresh_token = self.sign(principal, TokenKind::Refresh, now, refresh_expires_at)?;

        debug!(
            access_exp = access_expires_at.timestamp(),
            refresh_exp = refresh_expires_at.timestamp(),
            "Issued token pair"
        );

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at,
            refresh_expires_at,
        })
    }

    fn sign(
        &self,
        principal: &str,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            principal: principal.to_string(),
            kind,
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            debug!(error = %e, %kind, "Failed to encode JWT token");
            AuthError::Signing(e.to_string())
        })
    }
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, AuthError> {
    now.checked_add_signed(ttl).ok_or_else(|| {
        debug!(ttl_secs = ttl.num_seconds(), "Token expiry out of range");
        AuthError::Signing("token expiry out of range".to_string())
    })
}

/// Stateless token verification: signature, then expiry, then principal, then kind.
///
/// Revocation is layered on top by the session service.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenVerifier {
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock below.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            clock,
        }
    }

    #[instrument(skip(self, token))]
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Failed to decode JWT token");
                match e.kind() {
                    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                        AuthError::BadSignature
                    }
                    _ => AuthError::MalformedToken,
                }
            })?;

        if self.clock.now().timestamp() >= claims.exp {
            debug!(exp = claims.exp, "JWT token expired");
            return Err(AuthError::Expired);
        }

        if claims.principal != ADMIN_PRINCIPAL {
            debug!(principal = %claims.principal, "JWT token has unknown principal type");
            return Err(AuthError::UnknownPrincipalType);
        }

        if claims.kind != expected {
            debug!(kind = %claims.kind, %expected, "JWT token presented as the wrong kind");
            return Err(AuthError::WrongTokenKind);
        }

        Ok(claims)
    }
}
