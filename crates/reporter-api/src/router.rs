use axum::{
    Json, Router,
    http::{
        HeaderName, HeaderValue, Method, Request,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::{self, AppState};
use crate::config::AllowedOrigins;
use crate::integrations;
use crate::middleware::require_auth;
use crate::org;
use crate::webhooks;

/// All routes behind the auth gate. The gate itself lets the public paths
/// through.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/auth/login", post(auth::login))
        .route("/auth/session", get(auth::session))
        .route("/org/config", get(org::get_config).put(org::put_config))
        .route("/integrations/teams/validate", post(integrations::teams_validate))
        .route("/integrations/teams/save", post(integrations::teams_save))
        .route("/integrations/teams/send", post(integrations::teams_send))
        .route("/integrations/ai/save", post(integrations::ai_save))
        .route("/ai/summarize", post(integrations::summarize))
        .route("/webhooks/teams", post(webhooks::teams_webhook))
        .route("/collections/responses", get(webhooks::list_responses))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
}

/// The router plus transport concerns: CORS, request IDs, tracing and
/// panic recovery.
pub fn app(state: AppState, origins: &AllowedOrigins) -> Router {
    router(state)
        .layer(CatchPanicLayer::new())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors_layer(origins))
}

pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-requested-with"),
        ]);

    match origins {
        // Browsers refuse credentials with a wildcard origin.
        AllowedOrigins::Any => cors.allow_origin(AllowOrigin::any()),
        AllowedOrigins::List(list) => cors
            .allow_origin(AllowOrigin::list(list.iter().cloned()))
            .allow_credentials(true),
    }
}

#[derive(Clone, Copy, Default)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(id))
    }
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "reporter-command-center-backend",
        "status": "ok",
    }))
}

async fn healthz() -> &'static str {
    "ok"
}
