use std::collections::hash_map::Entry;

use chrono::{DateTime, Utc};
use reporter_types::models::TeamsMessage;

use crate::models::{EventKey, SeenEvent};
use crate::{TenantStore, read, write};

impl TenantStore {
    // -- Dedup ledger --

    pub fn has_seen(&self, tenant_id: &str, event_id: &str) -> bool {
        read(&self.seen_events).contains_key(&EventKey::new(tenant_id, event_id))
    }

    /// Records the event if it is not already in the ledger. Returns `true`
    /// when this call inserted it; of several concurrent callers with the same
    /// key exactly one gets `true`.
    pub fn mark_seen(&self, tenant_id: &str, event_id: &str) -> bool {
        match write(&self.seen_events).entry(EventKey::new(tenant_id, event_id)) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(SeenEvent {
                    first_seen: Utc::now(),
                });
                true
            }
        }
    }

    pub fn first_seen(&self, tenant_id: &str, event_id: &str) -> Option<DateTime<Utc>> {
        read(&self.seen_events)
            .get(&EventKey::new(tenant_id, event_id))
            .map(|e| e.first_seen)
    }

    /// Number of ledger entries across all tenants. The ledger is never
    /// pruned.
    pub fn seen_count(&self) -> usize {
        read(&self.seen_events).len()
    }

    // -- Delivered messages --

    pub fn append_message(&self, tenant_id: &str, message: TeamsMessage) {
        write(&self.messages)
            .entry(tenant_id.to_string())
            .or_default()
            .push(message);
    }

    /// Delivery-ordered copy of the tenant's messages.
    pub fn list_messages(&self, tenant_id: &str) -> Vec<TeamsMessage> {
        read(&self.messages)
            .get(tenant_id)
            .cloned()
            .unwrap_or_default()
    }
}
