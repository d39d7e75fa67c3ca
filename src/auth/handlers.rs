use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, StatusCode},
    Extension, Json,
};
use tracing::{info, instrument, warn};

use super::types::{AccessTokenResponse, Claims, Credentials, SessionInfo, TokenPair};
use crate::config::CookieConfig;
use crate::shared::{AppError, AppState};

type WithCookie<T> = ([(HeaderName, String); 1], T);

/// Extracts the token from an `Authorization: <scheme> <token>` header
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split_once(' '))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("access token required".to_string()))
}

/// Reads a single cookie value from the `Cookie` header(s)
fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

fn refresh_cookie(config: &CookieConfig, value: &str, max_age_secs: i64) -> String {
    let mut cookie = format!(
        "{}={}; Max-Age={}; Path={}; HttpOnly; SameSite=Strict",
        config.name,
        value,
        max_age_secs.max(0),
        config.path
    );
    if let Some(domain) = &config.domain {
        cookie.push_str(&format!("; Domain={}", domain));
    }
    if config.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn token_response(state: &AppState, pair: TokenPair) -> WithCookie<Json<AccessTokenResponse>> {
    let max_age = state.session_service.refresh_token_ttl().num_seconds();
    let cookie = refresh_cookie(&state.cookie, &pair.refresh_token, max_age);
    (
        [(header::SET_COOKIE, cookie)],
        Json(AccessTokenResponse {
            access_token: pair.access_token,
        }),
    )
}

/// POST /admin/auth/sign-in
///
/// Returns the access token in the body and sets the refresh token cookie
#[instrument(name = "sign_in", skip(state, credentials))]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<WithCookie<Json<AccessTokenResponse>>, AppError> {
    let pair = state.session_service.sign_in(&credentials)?;
    Ok(token_response(&state, pair))
}

/// GET /admin/auth/refresh
#[instrument(name = "refresh", skip(state, headers))]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<WithCookie<Json<AccessTokenResponse>>, AppError> {
    let refresh_token = read_cookie(&headers, &state.cookie.name).ok_or_else(|| {
        warn!("Refresh requested without a refresh token cookie");
        AppError::Forbidden("bad refresh token".to_string())
    })?;

    let pair = state.session_service.refresh(refresh_token).await?;
    Ok(token_response(&state, pair))
}

/// GET /admin/auth/logout
///
/// Revokes the presented tokens and clears the refresh token cookie
#[instrument(name = "logout", skip(state, headers))]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<WithCookie<StatusCode>, AppError> {
    let access_token = bearer_token(&headers)?;
    let refresh_token = read_cookie(&headers, &state.cookie.name);

    state
        .session_service
        .logout(access_token, refresh_token)
        .await?;

    let cleared = refresh_cookie(&state.cookie, "", 0);
    Ok(([(header::SET_COOKIE, cleared)], StatusCode::OK))
}

/// GET /admin/auth/session
///
/// Describes the access token that passed `jwt_auth`
#[instrument(name = "current_session", skip(claims))]
pub async fn current_session(Extension(claims): Extension<Claims>) -> Json<SessionInfo> {
    info!(principal = %claims.principal, "Session details requested");
    Json(SessionInfo::from(&claims))
}
