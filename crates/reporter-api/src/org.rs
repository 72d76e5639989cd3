use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::info;

use reporter_types::api::Claims;
use reporter_types::models::OrgConfig;

use crate::auth::AppState;
use crate::error::ApiError;

/// Tenants that never saved a config get an empty one rather than a 404.
pub async fn get_config(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Json<OrgConfig> {
    let cfg = state
        .store
        .get_org(&claims.tenant_id)
        .unwrap_or_else(|| OrgConfig::empty(&claims.tenant_id));
    Json(cfg)
}

/// Whole-record overwrite. The tenant always comes from the token, never
/// from the body.
pub async fn put_config(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<OrgConfig>, JsonRejection>,
) -> Result<Json<OrgConfig>, ApiError> {
    let Json(mut cfg) = body?;
    cfg.tenant_id = claims.tenant_id;
    let stored = state.store.save_org(cfg);
    info!(tenant_id = %stored.tenant_id, "Org config saved");
    Ok(Json(stored))
}
