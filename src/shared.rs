use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::auth::{service::SessionService, AuthError};
use crate::config::CookieConfig;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<SessionService>,
    pub cookie: Arc<CookieConfig>,
}

impl AppState {
    pub fn new(session_service: Arc<SessionService>, cookie: CookieConfig) -> Self {
        Self {
            session_service,
            cookie: Arc::new(cookie),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Auth(err) => {
                let status = match err {
                    AuthError::Expired => StatusCode::UNAUTHORIZED,
                    AuthError::WrongLoginOrPassword
                    | AuthError::BadSignature
                    | AuthError::UnknownPrincipalType
                    | AuthError::MalformedToken
                    | AuthError::WrongTokenKind
                    | AuthError::AlreadyLoggedOut => StatusCode::FORBIDDEN,
                    AuthError::StoreTimeout => StatusCode::SERVICE_UNAVAILABLE,
                    AuthError::Store(_) | AuthError::Signing(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                let message = match err {
                    AuthError::UnknownPrincipalType
                    | AuthError::MalformedToken
                    | AuthError::WrongTokenKind => "wrong token".to_string(),
                    AuthError::Store(_) | AuthError::Signing(_) => {
                        "Internal server error".to_string()
                    }
                    other => other.to_string(),
                };
                (status, message)
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Auth(err) = &self {
            if err.is_infrastructure() {
                error!(error = %err, "Request failed on infrastructure error");
            }
        }

        let (status, error_message) = self.status_and_message();

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
