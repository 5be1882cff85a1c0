//! End-to-end query scenarios over the in-memory event log

use std::sync::Arc;

use bot_server::OrderQueryEngine;
use bot_server::store::MemoryEventLog;
use serde_json::json;
use shared::models::{OrderEvent, event_type};
use shared::util::now_millis;

fn engine(log: Arc<MemoryEventLog>) -> OrderQueryEngine {
    OrderQueryEngine::new(log, 30, 7)
}

fn status_event(order_id: &str, occurred_at: i64, status: &str) -> OrderEvent {
    OrderEvent {
        id: occurred_at,
        order_id: order_id.to_string(),
        order_number: None,
        event_type: event_type::STATUS_CHANGED.to_string(),
        occurred_at,
        payload: json!({ "status": status }),
    }
}

/// The reference scenario: events [A@t1 New, A@t3 Completed, B@t2 New].
/// Active view projects {A: Completed@t3, B: New@t2}; completed view
/// contains A only.
#[tokio::test]
async fn reference_projection_scenario() {
    let now = now_millis();
    let (t1, t2, t3) = (now - 3_000, now - 2_000, now - 1_000);

    let log = Arc::new(MemoryEventLog::new());
    log.extend([
        status_event("A", t1, "New"),
        status_event("A", t3, "Completed"),
        status_event("B", t2, "New"),
    ])
    .await;
    let engine = engine(log);

    let active = engine.active_orders().await.unwrap();
    assert_eq!(active.len(), 2);
    assert_eq!(active[0].order_id, "A");
    assert_eq!(active[0].payload.status, "Completed");
    assert_eq!(active[0].occurred_at, t3);
    assert_eq!(active[1].order_id, "B");
    assert_eq!(active[1].payload.status, "New");
    assert_eq!(active[1].occurred_at, t2);

    let completed = engine.completed_orders().await.unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].order_id, "A");
}

/// Deletion is excluded at the fetch boundary: an order whose only
/// surviving rows are deletions vanishes, but any non-delete event left
/// in the window makes it reappear carrying that event's state.
#[tokio::test]
async fn deleted_order_visibility_follows_window_exclusion() {
    let now = now_millis();
    let log = Arc::new(MemoryEventLog::new());
    log.extend([
        status_event("gone", now - 5_000, "New"),
        OrderEvent {
            id: 1,
            order_id: "gone".to_string(),
            order_number: None,
            event_type: event_type::ORDER_DELETED.to_string(),
            occurred_at: now - 1_000,
            payload: json!({}),
        },
    ])
    .await;
    let engine = engine(log);

    let active = engine.active_orders().await.unwrap();
    // The deletion row is filtered out, the older status row survives,
    // so the order still shows - with its pre-deletion state
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].order_id, "gone");
    assert_eq!(active[0].occurred_at, now - 5_000);
}

#[tokio::test]
async fn events_outside_the_lookback_window_are_invisible() {
    let now = now_millis();
    let log = Arc::new(MemoryEventLog::new());
    log.extend([
        status_event("old", now - 40 * 86_400_000, "New"),
        status_event("fresh", now - 1_000, "New"),
    ])
    .await;

    let active = engine(log).active_orders().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].order_id, "fresh");
}

#[tokio::test]
async fn status_filter_truncation_accounting() {
    let now = now_millis();
    let log = Arc::new(MemoryEventLog::new());
    for i in 0..33 {
        log.push(status_event(&format!("o{i}"), now - 1_000 - i, "In Transit CHN-IR"))
            .await;
    }
    let page = engine(log).filter_by_status("In Transit").await.unwrap();
    assert_eq!(page.rows.len(), 20);
    assert_eq!(page.remainder, 13);
}

#[tokio::test]
async fn malformed_payloads_never_drop_rows() {
    let now = now_millis();
    let log = Arc::new(MemoryEventLog::new());
    let mut broken = status_event("x", now - 1_000, "");
    broken.payload = json!("{definitely not json");
    log.push(broken).await;
    log.push(status_event("y", now - 2_000, "New")).await;

    let active = engine(log).active_orders().await.unwrap();
    assert_eq!(active.len(), 2);
    let x = active.iter().find(|o| o.order_id == "x").unwrap();
    assert_eq!(x.payload.status, "");
}
