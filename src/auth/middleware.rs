use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{info, instrument, warn};

use super::handlers::bearer_token;
use crate::shared::{AppError, AppState};

/// JWT authentication middleware - validates the Authorization header and adds Claims to the request.
/// Usage: .layer(middleware::from_fn_with_state(app_state.clone(), auth::jwt_auth))
/// Handlers can then extract Extension(claims): Extension<Claims>.
#[instrument(skip(state, req, next))]
pub async fn jwt_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    info!(uri = %req.uri(), "JWT authentication middleware triggered");

    let token = bearer_token(req.headers())
        .map_err(|e| {
            warn!("Missing or malformed Authorization header");
            e
        })?
        .to_string();

    let claims = match state.session_service.verify(&token).await {
        Ok(claims) => claims,
        Err(e) => {
            warn!(error = %e, "JWT authentication failed");
            return Err(e.into());
        }
    };

    info!(principal = %claims.principal, "Authentication successful, adding claims to request");

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
