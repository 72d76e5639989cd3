use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::info;

use reporter_store::TenantStore;
use reporter_types::api::{Claims, LoginRequest, LoginResponse};

use crate::error::ApiError;
use crate::token::TokenCodec;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: TenantStore,
    pub codec: TokenCodec,
}

impl AppStateInner {
    pub fn new(store: TenantStore, codec: TokenCodec) -> AppState {
        Arc::new(Self { store, codec })
    }
}

/// Demo login: any non-empty password is accepted for the given identity.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = body?;
    if req.tenant_id.is_empty() || req.user_id.is_empty() || req.email.is_empty() {
        return Err(ApiError::BadRequest("missing fields"));
    }
    if req.password.is_empty() {
        return Err(ApiError::InvalidLogin);
    }

    let claims = Claims::new(
        req.tenant_id,
        req.user_id,
        req.email,
        req.role.unwrap_or_default(),
    );
    info!(tenant_id = %claims.tenant_id, user_id = %claims.user_id, "Issuing token");

    let access_token = state.codec.issue(claims)?;
    Ok(Json(LoginResponse { access_token }))
}

pub async fn session(Extension(claims): Extension<Claims>) -> Json<Claims> {
    Json(claims)
}
