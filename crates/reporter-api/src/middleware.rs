use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use thiserror::Error;
use tracing::warn;

use reporter_types::api::Claims;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::token::{TokenCodec, TokenError};

/// Exact paths reachable without a bearer token.
const PUBLIC_PATHS: &[&str] = &["/", "/healthz", "/auth/login"];

/// Webhooks authenticate with body signatures instead.
const WEBHOOK_PREFIX: &str = "/webhooks/";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingCredential,
    /// Every verification failure collapses into this variant; the cause is
    /// kept for logs only.
    #[error("invalid token: {0}")]
    InvalidCredential(#[source] TokenError),
}

pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path) || path.starts_with(WEBHOOK_PREFIX)
}

/// Extract and verify the bearer token from the Authorization header.
pub fn authenticate(headers: &HeaderMap, codec: &TokenCodec) -> Result<Claims, AuthError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingCredential)?;

    codec.verify(token).map_err(AuthError::InvalidCredential)
}

/// Router-wide gate. Verified claims are inserted into the request
/// extensions, where handlers take them as `Extension<Claims>`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if is_public(req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let claims = authenticate(req.headers(), &state.codec).inspect_err(|e| {
        warn!(path = %req.uri().path(), error = %e, "Rejected request");
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
