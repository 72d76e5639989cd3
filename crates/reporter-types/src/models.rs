use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Records that are partitioned by tenant. The store keys every save on
/// the record's own tenant ID.
pub trait TenantScoped {
    fn tenant_id(&self) -> &str;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Admin,
    User,
}

/// A single AI feature flag. Flags are either switches, numeric knobs or
/// short strings; anything nested is rejected at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Per-tenant organization settings. Wire keys match the dashboard's
/// existing payloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrgConfig {
    pub tenant_id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "fuso")]
    pub timezone: String,
    #[serde(rename = "janela_inicio")]
    pub window_start: String,
    #[serde(rename = "janela_fim")]
    pub window_end: String,
    #[serde(rename = "frequencia_horas")]
    pub frequency_hours: u32,
    #[serde(rename = "flags_ia")]
    pub ai_flags: HashMap<String, FlagValue>,
    #[serde(rename = "pre_prompt")]
    pub prompt_prefix: String,
    /// Stamped by the store on every save; any client-supplied value is
    /// overwritten.
    pub updated_at: Option<DateTime<Utc>>,
}

impl OrgConfig {
    /// The zero-valued record handed out for tenants that never saved one.
    pub fn empty(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            ..Self::default()
        }
    }
}

/// Messaging integration credentials. `webhook_secret` is the key inbound
/// webhook signatures are checked against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamsIntegration {
    pub tenant_id: String,
    pub app_id: String,
    pub app_secret: String,
    pub webhook_secret: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiConfig {
    pub tenant_id: String,
    pub provider: String,
    pub api_key: String,
}

/// A message delivered through the messaging webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamsMessage {
    pub channel_id: String,
    pub user_id: String,
    pub text: String,
}

impl TenantScoped for OrgConfig {
    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }
}

impl TenantScoped for TeamsIntegration {
    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }
}

impl TenantScoped for AiConfig {
    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }
}
