//! Order lifecycle events - immutable facts delivered by the event log

use serde::{Deserialize, Serialize};

use crate::error::MalformedPayload;

/// Well-known event type tags.
///
/// The set is open-ended: the upstream sync pipeline may introduce new
/// tags at any time, so [`OrderEvent::event_type`] stays a plain
/// `String` and these constants only name the tags this service treats
/// specially.
pub mod event_type {
    /// Order removed upstream. Excluded from projection input at the
    /// fetch boundary, never inside the fold.
    pub const ORDER_DELETED: &str = "ORDER_DELETED";
    /// Order has no loading photo attached
    pub const MISSING_PHOTO: &str = "MISSING_PHOTO";
    /// Deadline falling due inside the look-ahead window
    pub const UPCOMING_DEADLINE: &str = "UPCOMING_DEADLINE";
    /// Ordinary lifecycle tags
    pub const ORDER_CREATED: &str = "ORDER_CREATED";
    pub const STATUS_CHANGED: &str = "STATUS_CHANGED";
}

/// One timestamped fact about an order, as stored in the append-only log.
///
/// Read-only to this service; rows are produced by the sync pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Row ID in the external log
    pub id: i64,
    /// Stable opaque order identifier
    pub order_id: String,
    /// Human-facing label; fall back to `order_id` when absent
    pub order_number: Option<String>,
    /// Open-ended tag, see [`event_type`]
    pub event_type: String,
    /// Unix milliseconds; ordering and window-filtering key
    pub occurred_at: i64,
    /// Loosely structured attributes, see [`EventPayload::parse`]
    pub payload: serde_json::Value,
}

impl OrderEvent {
    /// Label shown to users: order number when present, raw id otherwise.
    pub fn display_number(&self) -> &str {
        self.order_number.as_deref().unwrap_or(&self.order_id)
    }
}

/// Typed view of an event payload.
///
/// Every field defaults (empty string / zero) when absent - an event
/// with a sparse payload is normal, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventPayload {
    pub client: String,
    pub containers: i64,
    pub weight: f64,
    pub status: String,
    pub title: String,
    pub description: String,
}

impl EventPayload {
    /// Interpret a raw payload value.
    ///
    /// Accepts either a JSON object or a JSON-encoded string containing
    /// one (double-encoded rows exist upstream). `null` reads as the
    /// empty payload. Anything else is [`MalformedPayload`]; callers
    /// apply the default-substitution policy rather than dropping the
    /// event or failing the query.
    pub fn parse(raw: &serde_json::Value) -> Result<Self, MalformedPayload> {
        match raw {
            serde_json::Value::Null => Ok(Self::default()),
            serde_json::Value::Object(_) => serde_json::from_value(raw.clone())
                .map_err(|e| MalformedPayload(e.to_string())),
            serde_json::Value::String(s) => serde_json::from_str(s)
                .map_err(|e| MalformedPayload(e.to_string())),
            other => Err(MalformedPayload(format!(
                "expected object or string, got {other}"
            ))),
        }
    }

    /// [`Self::parse`] with the default-substitution policy applied.
    pub fn parse_or_default(raw: &serde_json::Value) -> Self {
        Self::parse(raw).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_object_with_missing_fields_defaults() {
        let payload = EventPayload::parse(&json!({"client": "Acme", "containers": 3})).unwrap();
        assert_eq!(payload.client, "Acme");
        assert_eq!(payload.containers, 3);
        assert_eq!(payload.weight, 0.0);
        assert_eq!(payload.status, "");
    }

    #[test]
    fn parse_double_encoded_string() {
        let raw = json!("{\"status\": \"In Transit CHN-IR\", \"weight\": 1200.5}");
        let payload = EventPayload::parse(&raw).unwrap();
        assert_eq!(payload.status, "In Transit CHN-IR");
        assert_eq!(payload.weight, 1200.5);
    }

    #[test]
    fn parse_null_is_empty_payload() {
        assert_eq!(
            EventPayload::parse(&serde_json::Value::Null).unwrap(),
            EventPayload::default()
        );
    }

    #[test]
    fn parse_garbage_is_malformed() {
        assert!(EventPayload::parse(&json!("not json at all")).is_err());
        assert!(EventPayload::parse(&json!([1, 2, 3])).is_err());
        // Wrong field type poisons the whole structure, defaults take over
        assert!(EventPayload::parse(&json!({"containers": "three"})).is_err());
    }

    #[test]
    fn parse_or_default_substitutes_whole_structure() {
        assert_eq!(
            EventPayload::parse_or_default(&json!([1, 2, 3])),
            EventPayload::default()
        );
    }

    #[test]
    fn display_number_falls_back_to_order_id() {
        let mut event = OrderEvent {
            id: 1,
            order_id: "ord-17".to_string(),
            order_number: Some("MLS-0017".to_string()),
            event_type: event_type::ORDER_CREATED.to_string(),
            occurred_at: 0,
            payload: serde_json::Value::Null,
        };
        assert_eq!(event.display_number(), "MLS-0017");
        event.order_number = None;
        assert_eq!(event.display_number(), "ord-17");
    }
}
