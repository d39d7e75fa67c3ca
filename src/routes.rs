use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth;
use crate::shared::AppState;

/// Builds the admin API router.
///
/// Sign-in (also reachable under its legacy `/sing-in` spelling), refresh and
/// logout are public; everything mounted in `protected`
/// passes through `jwt_auth` first.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/session", get(auth::current_session))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::jwt_auth));

    let auth_routes = Router::new()
        .route("/sign-in", post(auth::sign_in))
        // Path used by clients built against the previous backend.
        .route("/sing-in", post(auth::sign_in))
        .route("/refresh", get(auth::refresh))
        .route("/logout", get(auth::logout))
        .merge(protected);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/admin/auth", auth_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
