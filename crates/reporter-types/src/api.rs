use serde::{Deserialize, Serialize};

use crate::models::Role;

// -- Token claims --

/// Identity carried inside a bearer token. `iat` and `exp` are epoch
/// seconds and are always set by the signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub tenant_id: String,
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Claims with an empty validity window, ready to be signed.
    pub fn new(
        tenant_id: impl Into<String>,
        user_id: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            email: email.into(),
            role,
            iat: 0,
            exp: 0,
        }
    }
}

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

// -- Integrations --

#[derive(Debug, Deserialize)]
pub struct TeamsCredentialsRequest {
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub app_secret: String,
    #[serde(default)]
    pub webhook_secret: String,
}

impl TeamsCredentialsRequest {
    pub fn is_complete(&self) -> bool {
        !self.app_id.is_empty() && !self.app_secret.is_empty() && !self.webhook_secret.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TeamsSendRequest {
    pub channel_id: String,
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AiSaveRequest {
    pub provider: String,
    pub api_key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SummarizeRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

// -- Generic --

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
