//! Derived per-order state

use serde::{Deserialize, Serialize};

use super::event::EventPayload;

/// Current-state view of one order, carried by the event selected as
/// "current" inside the query window.
///
/// Recomputed from a fresh fetch on every query; never persisted. A
/// projection is only as fresh as the window it was computed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderProjection {
    pub order_id: String,
    pub order_number: Option<String>,
    /// `occurred_at` of the selected event
    pub occurred_at: i64,
    pub payload: EventPayload,
}

impl OrderProjection {
    /// Label shown to users: order number when present, raw id otherwise.
    pub fn display_number(&self) -> &str {
        self.order_number.as_deref().unwrap_or(&self.order_id)
    }
}
