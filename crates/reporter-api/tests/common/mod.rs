#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Duration;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use reporter_api::auth::{AppState, AppStateInner};
use reporter_api::router;
use reporter_api::token::TokenCodec;
use reporter_store::TenantStore;

pub const SECRET: &[u8] = b"test-signing-secret";

pub fn state() -> AppState {
    AppStateInner::new(
        TenantStore::new(),
        TokenCodec::new(SECRET, Duration::hours(24)),
    )
}

pub fn app(state: &AppState) -> Router {
    router::router(state.clone())
}

/// Sends one request through a fresh router and returns status plus the body
/// parsed as JSON (or as a JSON string for non-JSON bodies).
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Logs in through the API and returns the access token.
pub async fn login(state: &AppState, tenant: &str, user: &str) -> String {
    let body = serde_json::json!({
        "tenant_id": tenant,
        "user_id": user,
        "email": format!("{user}@x.com"),
        "password": "pw",
    });
    let (status, body) = send(app(state), json_request("POST", "/auth/login", None, &body)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["access_token"].as_str().unwrap().to_string()
}
