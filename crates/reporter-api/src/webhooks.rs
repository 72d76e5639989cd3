//! Inbound messaging webhooks.
//!
//! A delivery is authenticated by an HMAC-SHA256 over the raw body keyed by
//! the tenant's webhook secret, then deduplicated on its event ID, then
//! recorded. Senders retry until they see a success, so the same event can
//! arrive many times; with an `X-Event-ID` it is recorded at most once.
//! Deliveries without an event ID are recorded every time they arrive.

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::HeaderMap,
};
use bytes::Bytes;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, info, warn};

use reporter_store::TenantStore;
use reporter_types::api::{Claims, StatusResponse};
use reporter_types::models::TeamsMessage;

use crate::auth::AppState;
use crate::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 of the raw body.
pub const SIGNATURE_HEADER: &str = "x-signature";
/// Optional sender-assigned delivery ID, stable across retries.
pub const EVENT_ID_HEADER: &str = "x-event-id";

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing tenant")]
    MissingTenant,
    #[error("integration not configured")]
    IntegrationNotConfigured,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid event id")]
    InvalidEventId,
    #[error("bad payload: {0}")]
    MalformedPayload(#[source] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Received,
    Duplicate,
}

impl IngestOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Duplicate => "duplicate",
        }
    }
}

/// One inbound delivery, as read off the wire. `body` is the raw request
/// body; the signature covers these exact bytes.
#[derive(Debug, Clone, Copy)]
pub struct Delivery<'a> {
    pub tenant_id: Option<&'a str>,
    pub signature: Option<&'a str>,
    pub event_id: Option<&'a str>,
    pub body: &'a [u8],
}

/// Runs a delivery to completion. Nothing is written to the store unless
/// the signature checks out and the event is new.
pub fn ingest(store: &TenantStore, delivery: &Delivery<'_>) -> Result<IngestOutcome, WebhookError> {
    let tenant_id = delivery
        .tenant_id
        .filter(|t| !t.is_empty())
        .ok_or(WebhookError::MissingTenant)?;

    let integration = store
        .get_teams(tenant_id)
        .ok_or(WebhookError::IntegrationNotConfigured)?;
    if integration.webhook_secret.is_empty() {
        return Err(WebhookError::IntegrationNotConfigured);
    }

    verify_signature(
        delivery.body,
        delivery.signature.unwrap_or_default(),
        &integration.webhook_secret,
    )?;

    let event_id = delivery.event_id.filter(|e| !e.is_empty());

    if let Some(event_id) = event_id {
        if store.has_seen(tenant_id, event_id) {
            debug!(tenant_id, event_id, "Duplicate webhook delivery");
            return Ok(IngestOutcome::Duplicate);
        }
    }

    // Parse before claiming the event ID so a bad body can be retried.
    let message: TeamsMessage =
        serde_json::from_slice(delivery.body).map_err(WebhookError::MalformedPayload)?;

    if let Some(event_id) = event_id {
        // Another delivery of this event got here first.
        if !store.mark_seen(tenant_id, event_id) {
            debug!(tenant_id, event_id, "Duplicate webhook delivery (lost race)");
            return Ok(IngestOutcome::Duplicate);
        }
    }

    info!(
        tenant_id,
        event_id = event_id.unwrap_or("none"),
        channel_id = %message.channel_id,
        "Webhook message received"
    );
    store.append_message(tenant_id, message);
    Ok(IngestOutcome::Received)
}

fn body_mac(body: &[u8], secret: &str) -> Result<HmacSha256, WebhookError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| WebhookError::InvalidSignature)?;
    mac.update(body);
    Ok(mac)
}

/// Lowercase hex HMAC-SHA256 of `body`, the value senders put in
/// `X-Signature`.
pub fn sign_body(body: &[u8], secret: &str) -> Result<String, WebhookError> {
    let mac = body_mac(body, secret)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a hex signature. Hex digits may be either case.
pub fn verify_signature(body: &[u8], signature: &str, secret: &str) -> Result<(), WebhookError> {
    let provided = hex::decode(signature).map_err(|_| WebhookError::InvalidSignature)?;
    body_mac(body, secret)?
        .verify_slice(&provided)
        .map_err(|_| WebhookError::InvalidSignature)
}

#[derive(Debug, Deserialize)]
pub struct WebhookQuery {
    pub tenant: Option<String>,
}

/// POST /webhooks/teams?tenant=<id>
pub async fn teams_webhook(
    State(state): State<AppState>,
    Query(query): Query<WebhookQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<StatusResponse>, ApiError> {
    let event_id = event_id_header(&headers).inspect_err(|e| {
        warn!(tenant = ?query.tenant, error = %e, "Webhook rejected");
    })?;
    let delivery = Delivery {
        tenant_id: query.tenant.as_deref(),
        signature: header_str(&headers, SIGNATURE_HEADER),
        event_id,
        body: &body,
    };

    let outcome = ingest(&state.store, &delivery).inspect_err(|e| {
        warn!(tenant = ?delivery.tenant_id, error = %e, "Webhook rejected");
    })?;

    Ok(Json(StatusResponse::new(outcome.as_str())))
}

/// GET /collections/responses
pub async fn list_responses(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Json<Vec<TeamsMessage>> {
    Json(state.store.list_messages(&claims.tenant_id))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// An absent `X-Event-ID` means "no dedup"; a present one must be UTF-8 so
/// it can key the ledger.
fn event_id_header(headers: &HeaderMap) -> Result<Option<&str>, WebhookError> {
    headers
        .get(EVENT_ID_HEADER)
        .map(|v| std::str::from_utf8(v.as_bytes()).map_err(|_| WebhookError::InvalidEventId))
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use reporter_types::models::TeamsIntegration;

    use super::*;

    const BODY: &[u8] = br#"{"channel_id":"c1","user_id":"u1","text":"hi"}"#;

    fn configured_store(tenant: &str, secret: &str) -> TenantStore {
        let store = TenantStore::new();
        store.save_teams(TeamsIntegration {
            tenant_id: tenant.into(),
            app_id: "app".into(),
            app_secret: "app-secret".into(),
            webhook_secret: secret.into(),
            status: "configured".into(),
        });
        store
    }

    fn delivery<'a>(signature: &'a str, event_id: Option<&'a str>, body: &'a [u8]) -> Delivery<'a> {
        Delivery {
            tenant_id: Some("t1"),
            signature: Some(signature),
            event_id,
            body,
        }
    }

    #[test]
    fn same_event_is_recorded_once() {
        let store = configured_store("t1", "whs");
        let sig = sign_body(BODY, "whs").unwrap();

        let first = ingest(&store, &delivery(&sig, Some("e1"), BODY)).unwrap();
        let second = ingest(&store, &delivery(&sig, Some("e1"), BODY)).unwrap();

        assert_eq!(first, IngestOutcome::Received);
        assert_eq!(second, IngestOutcome::Duplicate);
        let messages = store.list_messages("t1");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "hi");
    }

    #[test]
    fn altered_body_is_rejected_without_side_effects() {
        let store = configured_store("t1", "whs");
        let sig = sign_body(BODY, "whs").unwrap();
        let altered = br#"{"channel_id":"c1","user_id":"u1","text":"ho"}"#;

        let err = ingest(&store, &delivery(&sig, Some("e1"), altered)).unwrap_err();
        assert!(matches!(err, WebhookError::InvalidSignature));
        assert!(store.list_messages("t1").is_empty());
        assert!(!store.has_seen("t1", "e1"));
    }

    #[test]
    fn signature_comparison_ignores_case() {
        let store = configured_store("t1", "whs");
        let sig = sign_body(BODY, "whs").unwrap().to_uppercase();
        assert_eq!(
            ingest(&store, &delivery(&sig, None, BODY)).unwrap(),
            IngestOutcome::Received
        );
    }

    #[test]
    fn missing_or_garbage_signature_is_rejected() {
        let store = configured_store("t1", "whs");
        let mut d = delivery("", None, BODY);
        d.signature = None;
        assert!(matches!(ingest(&store, &d), Err(WebhookError::InvalidSignature)));
        assert!(matches!(
            ingest(&store, &delivery("zz-not-hex", None, BODY)),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn tenant_must_be_present_and_configured() {
        let store = configured_store("t1", "whs");
        let sig = sign_body(BODY, "whs").unwrap();

        let mut d = delivery(&sig, None, BODY);
        d.tenant_id = None;
        assert!(matches!(ingest(&store, &d), Err(WebhookError::MissingTenant)));

        d.tenant_id = Some("");
        assert!(matches!(ingest(&store, &d), Err(WebhookError::MissingTenant)));

        d.tenant_id = Some("t2");
        assert!(matches!(ingest(&store, &d), Err(WebhookError::IntegrationNotConfigured)));
    }

    #[test]
    fn empty_webhook_secret_is_not_a_trust_anchor() {
        let store = configured_store("t1", "");
        let sig = sign_body(BODY, "").unwrap();
        assert!(matches!(
            ingest(&store, &delivery(&sig, None, BODY)),
            Err(WebhookError::IntegrationNotConfigured)
        ));
    }

    #[test]
    fn deliveries_without_event_id_are_not_deduplicated() {
        let store = configured_store("t1", "whs");
        let sig = sign_body(BODY, "whs").unwrap();

        for _ in 0..3 {
            assert_eq!(
                ingest(&store, &delivery(&sig, None, BODY)).unwrap(),
                IngestOutcome::Received
            );
        }
        assert_eq!(store.list_messages("t1").len(), 3);
        assert_eq!(store.seen_count(), 0);
    }

    #[test]
    fn undecodable_event_id_is_rejected_not_ignored() {
        use axum::http::HeaderValue;

        let mut headers = HeaderMap::new();
        assert_eq!(event_id_header(&headers).unwrap(), None);

        headers.insert(EVENT_ID_HEADER, HeaderValue::from_bytes(b"evt-\xe9").unwrap());
        assert!(matches!(
            event_id_header(&headers),
            Err(WebhookError::InvalidEventId)
        ));

        headers.insert(EVENT_ID_HEADER, HeaderValue::from_bytes("evt-é".as_bytes()).unwrap());
        assert_eq!(event_id_header(&headers).unwrap(), Some("evt-é"));
    }

    #[test]
    fn malformed_payload_does_not_consume_event_id() {
        let store = configured_store("t1", "whs");
        let bad = b"not json";
        let bad_sig = sign_body(bad, "whs").unwrap();

        let err = ingest(&store, &delivery(&bad_sig, Some("e1"), bad)).unwrap_err();
        assert!(matches!(err, WebhookError::MalformedPayload(_)));
        assert!(!store.has_seen("t1", "e1"));

        let sig = sign_body(BODY, "whs").unwrap();
        assert_eq!(
            ingest(&store, &delivery(&sig, Some("e1"), BODY)).unwrap(),
            IngestOutcome::Received
        );
    }

    #[test]
    fn event_ids_are_scoped_to_their_tenant() {
        let store = configured_store("t1", "whs");
        store.save_teams(TeamsIntegration {
            tenant_id: "t2".into(),
            app_id: "app".into(),
            app_secret: "app-secret".into(),
            webhook_secret: "other".into(),
            status: "configured".into(),
        });

        let sig1 = sign_body(BODY, "whs").unwrap();
        let sig2 = sign_body(BODY, "other").unwrap();
        ingest(&store, &delivery(&sig1, Some("e1"), BODY)).unwrap();

        let mut d = delivery(&sig2, Some("e1"), BODY);
        d.tenant_id = Some("t2");
        assert_eq!(ingest(&store, &d).unwrap(), IngestOutcome::Received);
        assert_eq!(store.list_messages("t1").len(), 1);
        assert_eq!(store.list_messages("t2").len(), 1);
    }

    #[test]
    fn concurrent_distinct_events_are_all_recorded() {
        let store = Arc::new(configured_store("t1", "whs"));

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                thread::spawn(move || {
                    let body = format!(r#"{{"channel_id":"c1","user_id":"u1","text":"m{i}"}}"#);
                    let sig = sign_body(body.as_bytes(), "whs").unwrap();
                    let event_id = format!("e{i}");
                    ingest(&store, &delivery(&sig, Some(&event_id), body.as_bytes()))
                })
            })
            .collect();

        for h in handles {
            assert_eq!(h.join().unwrap().unwrap(), IngestOutcome::Received);
        }

        let mut texts: Vec<String> = store.list_messages("t1").into_iter().map(|m| m.text).collect();
        texts.sort();
        let mut expected: Vec<String> = (0..32).map(|i| format!("m{i}")).collect();
        expected.sort();
        assert_eq!(texts, expected);
    }

    #[test]
    fn concurrent_duplicates_record_one_message() {
        let store = Arc::new(configured_store("t1", "whs"));
        let sig = sign_body(BODY, "whs").unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                let sig = sig.clone();
                thread::spawn(move || ingest(&store, &delivery(&sig, Some("e1"), BODY)).unwrap())
            })
            .collect();

        let received = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|o| *o == IngestOutcome::Received)
            .count();
        assert_eq!(received, 1);
        assert_eq!(store.list_messages("t1").len(), 1);
    }
}
