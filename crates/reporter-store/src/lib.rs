pub mod events;
pub mod models;
pub mod records;

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use reporter_types::models::{AiConfig, OrgConfig, TeamsIntegration, TeamsMessage};
use tracing::info;

use crate::models::{EventKey, SeenEvent};

/// Process-lifetime, in-memory state shared by every request.
///
/// Each entity type lives behind its own lock so unrelated operations never
/// contend. Every mutation is a single map operation under a write lock, so
/// readers never observe a partially written record.
pub struct TenantStore {
    orgs: RwLock<HashMap<String, OrgConfig>>,
    teams: RwLock<HashMap<String, TeamsIntegration>>,
    ai: RwLock<HashMap<String, AiConfig>>,
    seen_events: RwLock<HashMap<EventKey, SeenEvent>>,
    messages: RwLock<HashMap<String, Vec<TeamsMessage>>>,
}

impl TenantStore {
    pub fn new() -> Self {
        info!("Tenant store initialised (in-memory)");
        Self {
            orgs: RwLock::new(HashMap::new()),
            teams: RwLock::new(HashMap::new()),
            ai: RwLock::new(HashMap::new()),
            seen_events: RwLock::new(HashMap::new()),
            messages: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for TenantStore {
    fn default() -> Self {
        Self::new()
    }
}

// A holder that panicked can only have been between whole-map operations,
// so the data behind a poisoned lock is still consistent.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
