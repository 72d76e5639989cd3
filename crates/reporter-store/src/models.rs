//! Ledger types. Distinct from reporter-types since they never leave the
//! store.

use chrono::{DateTime, Utc};

/// Dedup ledger key. Event IDs are only unique within a tenant, so the
/// tenant is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub tenant_id: String,
    pub event_id: String,
}

impl EventKey {
    pub fn new(tenant_id: &str, event_id: &str) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            event_id: event_id.to_string(),
        }
    }
}

/// A ledger entry. Entries are never removed; `first_seen` is what an
/// eviction policy would key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeenEvent {
    pub first_seen: DateTime<Utc>,
}
