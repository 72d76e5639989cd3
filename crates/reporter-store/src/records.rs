use std::collections::HashMap;
use std::sync::RwLock;

use reporter_types::models::{AiConfig, OrgConfig, TeamsIntegration, TenantScoped};

use crate::{TenantStore, read, write};

impl TenantStore {
    // -- Org config --

    pub fn get_org(&self, tenant_id: &str) -> Option<OrgConfig> {
        get(&self.orgs, tenant_id)
    }

    /// Replaces the tenant's whole record and stamps `updated_at`. Returns
    /// the record as stored.
    pub fn save_org(&self, mut cfg: OrgConfig) -> OrgConfig {
        cfg.updated_at = Some(chrono::Utc::now());
        save(&self.orgs, cfg.clone());
        cfg
    }

    // -- Messaging integration --

    pub fn get_teams(&self, tenant_id: &str) -> Option<TeamsIntegration> {
        get(&self.teams, tenant_id)
    }

    pub fn save_teams(&self, integration: TeamsIntegration) {
        save(&self.teams, integration);
    }

    // -- AI config --

    pub fn get_ai(&self, tenant_id: &str) -> Option<AiConfig> {
        get(&self.ai, tenant_id)
    }

    pub fn save_ai(&self, cfg: AiConfig) {
        save(&self.ai, cfg);
    }
}

fn get<T: Clone>(map: &RwLock<HashMap<String, T>>, tenant_id: &str) -> Option<T> {
    read(map).get(tenant_id).cloned()
}

/// Last writer wins; there is no version check.
fn save<T: TenantScoped>(map: &RwLock<HashMap<String, T>>, record: T) {
    let key = record.tenant_id().to_string();
    write(map).insert(key, record);
}
