use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use tower::ServiceExt; // for `oneshot`

/// Tokens handed out by a successful sign-in or refresh
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub access_token: String,
    pub refresh_token: String,
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&body).expect("body should be JSON")
}

/// Pulls the refresh token value out of a `Set-Cookie` header
pub fn refresh_cookie_value(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .next()?
        .strip_prefix("refresh_token=")
        .map(str::to_string)
}

/// Response and tokens of a sign-in attempt
pub async fn try_sign_in(app: &Router, login: &str, password: &str) -> Response {
    sign_in_at(app, "/admin/auth/sign-in", login, password).await
}

/// Sign-in attempt posted to an explicit path
pub async fn sign_in_at(app: &Router, path: &str, login: &str, password: &str) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "login": login, "password": password }).to_string(),
        ))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Signs in and returns both tokens, panicking on failure
pub async fn sign_in(app: &Router, login: &str, password: &str) -> SignedIn {
    let response = try_sign_in(app, login, password).await;
    assert_eq!(response.status(), StatusCode::OK, "sign-in should succeed");
    tokens_from(response).await
}

pub async fn tokens_from(response: Response) -> SignedIn {
    let refresh_token = refresh_cookie_value(&response).expect("refresh cookie should be set");
    let body = body_json(response).await;
    SignedIn {
        access_token: body["access_token"]
            .as_str()
            .expect("access_token should be present")
            .to_string(),
        refresh_token,
    }
}

/// Issues a GET with optional bearer token and refresh cookie
pub async fn get(
    app: &Router,
    uri: &str,
    access_token: Option<&str>,
    refresh_token: Option<&str>,
) -> Response {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = access_token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    if let Some(token) = refresh_token {
        builder = builder.header(header::COOKIE, format!("refresh_token={}", token));
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}
