//! Order projector - fold a window of events into per-order state

use std::collections::HashMap;

use shared::models::{EventPayload, OrderEvent, OrderProjection};

/// Reduce a fetched event window into one current-state entry per order.
///
/// Last-write-wins by `occurred_at`; on an exact timestamp tie the first
/// event encountered in input order is kept (strict `>` below). The
/// source delivers rows time-descending, so "first encountered"
/// coincides with "most recent delivered" - but the tie-break holds for
/// any input order and keeps the fold deterministic.
///
/// `ORDER_DELETED` exclusion happens at the fetch boundary, not here: an
/// order whose latest true event is a deletion simply has no input rows
/// and no entry. If a later non-delete event for that order is still
/// inside the window, the order reappears - ambiguous upstream behavior
/// kept as-is rather than special-cased.
///
/// The projector has no memory beyond its input; a projection is only as
/// fresh as the fetch that produced it.
pub fn project(events: &[OrderEvent]) -> HashMap<String, OrderProjection> {
    let mut current: HashMap<&str, &OrderEvent> = HashMap::new();
    for event in events {
        match current.get(event.order_id.as_str()) {
            Some(kept) if event.occurred_at <= kept.occurred_at => {}
            _ => {
                current.insert(&event.order_id, event);
            }
        }
    }

    current
        .into_values()
        .map(|event| {
            let projection = OrderProjection {
                order_id: event.order_id.clone(),
                order_number: event.order_number.clone(),
                occurred_at: event.occurred_at,
                payload: EventPayload::parse_or_default(&event.payload),
            };
            (event.order_id.clone(), projection)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::models::event_type;

    fn event(order_id: &str, occurred_at: i64, status: &str) -> OrderEvent {
        OrderEvent {
            id: occurred_at,
            order_id: order_id.to_string(),
            order_number: None,
            event_type: event_type::STATUS_CHANGED.to_string(),
            occurred_at,
            payload: json!({ "status": status }),
        }
    }

    #[test]
    fn one_entry_per_order() {
        let events = vec![
            event("a", 3, "Completed"),
            event("b", 2, "New"),
            event("a", 1, "New"),
            event("a", 2, "In Progress CHN"),
        ];
        let projected = project(&events);
        assert_eq!(projected.len(), 2);
    }

    #[test]
    fn latest_event_wins() {
        let events = vec![
            event("a", 3, "Completed"),
            event("a", 1, "New"),
            event("b", 2, "New"),
        ];
        let projected = project(&events);
        assert_eq!(projected["a"].occurred_at, 3);
        assert_eq!(projected["a"].payload.status, "Completed");
        assert_eq!(projected["b"].payload.status, "New");
    }

    #[test]
    fn deterministic_under_permutation() {
        let mut events = vec![
            event("a", 3, "Completed"),
            event("a", 1, "New"),
            event("b", 2, "New"),
            event("b", 5, "In Progress IR"),
        ];
        let expected = project(&events);
        events.reverse();
        let reversed = project(&events);
        events.swap(0, 2);
        let swapped = project(&events);

        for projected in [&reversed, &swapped] {
            assert_eq!(projected.len(), expected.len());
            for (order_id, entry) in &expected {
                assert_eq!(projected[order_id].occurred_at, entry.occurred_at);
                assert_eq!(projected[order_id].payload, entry.payload);
            }
        }
    }

    #[test]
    fn exact_tie_keeps_first_encountered() {
        let events = vec![event("a", 5, "first"), event("a", 5, "second")];
        assert_eq!(project(&events)["a"].payload.status, "first");
    }

    #[test]
    fn malformed_payload_projects_as_defaults() {
        let mut bad = event("a", 9, "");
        bad.payload = json!("{broken");
        let projected = project(&[bad]);
        assert_eq!(projected["a"].payload, EventPayload::default());
        assert_eq!(projected["a"].occurred_at, 9);
    }

    #[test]
    fn empty_input_projects_nothing() {
        assert!(project(&[]).is_empty());
    }
}
