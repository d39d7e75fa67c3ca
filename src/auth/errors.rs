use thiserror::Error;

/// Typed outcomes of the session core.
///
/// Everything except the infrastructure variants is a terminal, per-call
/// rejection. Infrastructure failures are safe to retry at the request level.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("wrong login or password")]
    WrongLoginOrPassword,

    #[error("token expired")]
    Expired,

    #[error("wrong signature")]
    BadSignature,

    #[error("unknown principal type")]
    UnknownPrincipalType,

    #[error("malformed token")]
    MalformedToken,

    #[error("token kind mismatch")]
    WrongTokenKind,

    #[error("you already logged out")]
    AlreadyLoggedOut,

    #[error("revocation store error: {0}")]
    Store(String),

    #[error("revocation store timed out")]
    StoreTimeout,

    #[error("token signing failed: {0}")]
    Signing(String),
}

impl AuthError {
    /// True for failures of the surrounding infrastructure rather than of the
    /// presented credential.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            AuthError::Store(_) | AuthError::StoreTimeout | AuthError::Signing(_)
        )
    }
}

impl From<redis::RedisError> for AuthError {
    fn from(err: redis::RedisError) -> Self {
        AuthError::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AuthError::WrongLoginOrPassword, false)]
    #[case(AuthError::Expired, false)]
    #[case(AuthError::BadSignature, false)]
    #[case(AuthError::UnknownPrincipalType, false)]
    #[case(AuthError::MalformedToken, false)]
    #[case(AuthError::WrongTokenKind, false)]
    #[case(AuthError::AlreadyLoggedOut, false)]
    #[case(AuthError::Store("connection refused".to_string()), true)]
    #[case(AuthError::StoreTimeout, true)]
    #[case(AuthError::Signing("bad key".to_string()), true)]
    fn test_infrastructure_classification(#[case] err: AuthError, #[case] expected: bool) {
        assert_eq!(err.is_infrastructure(), expected);
    }

    #[test]
    fn test_messages_match_client_wording() {
        assert_eq!(AuthError::AlreadyLoggedOut.to_string(), "you already logged out");
        assert_eq!(AuthError::Expired.to_string(), "token expired");
    }
}
