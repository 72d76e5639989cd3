use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use reporter_types::api::ErrorResponse;

use crate::middleware::AuthError;
use crate::token::TokenError;
use crate::webhooks::WebhookError;

/// Every way a request can fail. Each variant maps to exactly one status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Webhook(#[from] WebhookError),

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("bad request")]
    InvalidBody(#[from] JsonRejection),

    #[error("invalid credentials")]
    InvalidLogin,

    #[error("integration not configured")]
    IntegrationNotConfigured,

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Auth(_) | Self::InvalidLogin => StatusCode::UNAUTHORIZED,
            Self::Webhook(err) => match err {
                WebhookError::MissingTenant
                | WebhookError::InvalidEventId
                | WebhookError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
                WebhookError::IntegrationNotConfigured => StatusCode::NOT_FOUND,
                WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            },
            Self::BadRequest(_) | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::IntegrationNotConfigured => StatusCode::NOT_FOUND,
            // Verification failures arrive wrapped in `Auth`; a bare token
            // error can only come from signing.
            Self::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Never echo token internals to the client.
        let error = match &self {
            Self::Auth(AuthError::InvalidCredential(_)) => "invalid token".to_string(),
            Self::Token(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}
