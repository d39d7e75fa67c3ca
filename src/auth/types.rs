use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// The only principal class this service issues tokens for
pub const ADMIN_PRINCIPAL: &str = "admin";

/// Which half of a credential pair a token is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims carried by both access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    #[serde(rename = "type")]
    pub principal: String,
    pub kind: TokenKind,
    pub exp: i64, // Expiration timestamp (standard JWT claim)
    pub iat: i64, // Issued at timestamp (standard JWT claim)
    pub jti: String,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }
}

/// Freshly issued access/refresh pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Sign-in request body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

/// Body returned by sign-in and refresh; the refresh token travels as a cookie
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenResponse {
    pub access_token: String,
}

/// Details of the access token presented on a protected route
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionInfo {
    pub principal: String,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&Claims> for SessionInfo {
    fn from(claims: &Claims) -> Self {
        Self {
            principal: claims.principal.clone(),
            issued_at: claims.issued_at(),
            expires_at: claims.expires_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json;
    use strum::IntoEnumIterator;

    #[test]
    fn test_claims_serialization() {
        let claims = Claims {
            principal: ADMIN_PRINCIPAL.to_string(),
            kind: TokenKind::Refresh,
            exp: 1234567890,
            iat: 1234567800,
            jti: "abc".to_string(),
        };

        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains(r#""type":"admin""#));
        assert!(json.contains(r#""kind":"refresh""#));

        let deserialized: Claims = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, claims);
    }

    #[test]
    fn test_token_kind_display() {
        assert_eq!(TokenKind::Access.to_string(), "access");
        assert_eq!(TokenKind::Refresh.to_string(), "refresh");
    }

    #[test]
    fn test_token_kind_wire_name_matches_display() {
        for kind in TokenKind::iter() {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }

    #[test]
    fn test_session_info_from_claims() {
        let claims = Claims {
            principal: ADMIN_PRINCIPAL.to_string(),
            kind: TokenKind::Access,
            exp: 1_700_000_900,
            iat: 1_700_000_000,
            jti: "id".to_string(),
        };

        let info = SessionInfo::from(&claims);
        assert_eq!(info.principal, "admin");
        assert_eq!(info.expires_at.unwrap().timestamp(), 1_700_000_900);
        assert_eq!(info.issued_at.unwrap().timestamp(), 1_700_000_000);
    }
}
