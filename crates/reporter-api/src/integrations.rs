use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::info;

use reporter_types::api::{
    AiSaveRequest, Claims, StatusResponse, SummarizeRequest, SummarizeResponse,
    TeamsCredentialsRequest, TeamsSendRequest, ValidateResponse,
};
use reporter_types::models::{AiConfig, TeamsIntegration};

use crate::auth::AppState;
use crate::error::ApiError;

/// Summaries longer than this many characters are cut.
const SUMMARY_MAX_CHARS: usize = 240;

// -- Messaging integration --

pub async fn teams_validate(
    body: Result<Json<TeamsCredentialsRequest>, JsonRejection>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let Json(req) = body?;
    Ok(Json(ValidateResponse {
        valid: req.is_complete(),
    }))
}

pub async fn teams_save(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<TeamsCredentialsRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(req) = body?;
    state.store.save_teams(TeamsIntegration {
        tenant_id: claims.tenant_id.clone(),
        app_id: req.app_id,
        app_secret: req.app_secret,
        webhook_secret: req.webhook_secret,
        status: "configured".to_string(),
    });
    info!(tenant_id = %claims.tenant_id, "Teams integration saved");
    Ok(Json(StatusResponse::new("saved")))
}

/// Outbound delivery is simulated: the message is logged, not sent.
pub async fn teams_send(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<TeamsSendRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(req) = body?;
    let integration = state
        .store
        .get_teams(&claims.tenant_id)
        .ok_or(ApiError::IntegrationNotConfigured)?;

    info!(
        tenant_id = %claims.tenant_id,
        app_id = %integration.app_id,
        channel_id = %req.channel_id,
        text = %req.text,
        "Teams send"
    );
    Ok(Json(StatusResponse::new("sent")))
}

// -- AI --

pub async fn ai_save(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<AiSaveRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(req) = body?;
    info!(tenant_id = %claims.tenant_id, provider = %req.provider, "AI config saved");
    state.store.save_ai(AiConfig {
        tenant_id: claims.tenant_id,
        provider: req.provider,
        api_key: req.api_key,
    });
    Ok(Json(StatusResponse::new("saved")))
}

pub async fn summarize(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let Json(req) = body?;
    if state.store.get_ai(&claims.tenant_id).is_none() {
        return Err(ApiError::BadRequest("ai not configured"));
    }
    Ok(Json(SummarizeResponse {
        summary: naive_summary(&req.text),
    }))
}

/// Placeholder until a provider is wired in: trim and truncate.
fn naive_summary(text: &str) -> String {
    let text = text.trim();
    match text.char_indices().nth(SUMMARY_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_only_trimmed() {
        assert_eq!(naive_summary("  hello  "), "hello");
    }

    #[test]
    fn long_text_is_truncated_on_char_boundary() {
        let text = "é".repeat(300);
        let summary = naive_summary(&text);
        assert!(summary.ends_with("..."));
        assert_eq!(summary.chars().count(), SUMMARY_MAX_CHARS + 3);
    }

    #[test]
    fn exactly_max_is_kept_whole() {
        let text = "a".repeat(SUMMARY_MAX_CHARS);
        assert_eq!(naive_summary(&text), text);
    }
}
