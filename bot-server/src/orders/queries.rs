//! Order query engine
//!
//! One method per command-facing query. Each query owns its filter,
//! dedup policy, ordering and truncation - they differ on purpose:
//!
//! | Query | Dedup | Order | Truncation |
//! |-------|-------|-------|------------|
//! | active orders | one per order, latest wins | newest first | none here (chunked at send) |
//! | completed orders | one per order, first occurrence | newest first | none |
//! | status filter | none (audit trail) | newest first | 20 rows + remainder |
//! | missing photos | none (audit trail) | newest first | 15 rows |
//! | upcoming deadlines | none (audit trail) | soonest first | none |
//!
//! Active/completed views represent orders (one row = one order); the
//! audit-trail views represent matching events, several rows per order
//! allowed. Do not collapse these into one generic listing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use shared::models::{EventPayload, OrderEvent, OrderProjection, event_type};
use shared::util::now_millis;

use super::projector;
use crate::store::{EventFilter, EventLog};
use crate::utils::{AppResult, time};

/// Hard cap on status-filter rows; the remainder is reported, not dropped
pub const STATUS_FILTER_CAP: usize = 20;
/// Cap on missing-photo rows
pub const MISSING_PHOTO_CAP: usize = 15;
/// Number of events quoted in the activity summary
pub const SUMMARY_RECENT_EVENTS: usize = 10;
/// Terminal order status as written by the sync pipeline
pub const COMPLETED_STATUS: &str = "Completed";

/// One page of status-filter results
#[derive(Debug)]
pub struct StatusFilterPage {
    pub rows: Vec<OrderEvent>,
    /// Matching events beyond the cap
    pub remainder: usize,
}

/// Look-back totals backing the report command
#[derive(Debug)]
pub struct ActivitySummary {
    pub window_days: i64,
    pub total_events: usize,
    pub completed_events: usize,
    /// Most recent events, newest first
    pub recent: Vec<OrderEvent>,
}

/// Read-side query service over the event log.
///
/// Holds no cached state: every call recomputes from a fresh fetch, so
/// concurrent queries need no coordination.
pub struct OrderQueryEngine {
    log: Arc<dyn EventLog>,
    lookback_days: i64,
    upcoming_days: i64,
}

impl OrderQueryEngine {
    pub fn new(log: Arc<dyn EventLog>, lookback_days: i64, upcoming_days: i64) -> Self {
        Self {
            log,
            lookback_days,
            upcoming_days,
        }
    }

    fn lookback_filter(&self) -> EventFilter {
        EventFilter::window(time::days_ago_millis(self.lookback_days), now_millis())
    }

    /// Active orders: one entry per order, latest event wins, newest
    /// first. Deleted orders are excluded at the fetch boundary.
    pub async fn active_orders(&self) -> AppResult<Vec<OrderProjection>> {
        let filter = self.lookback_filter().event_type_ne(event_type::ORDER_DELETED);
        let events = self.log.fetch(&filter).await?;
        let mut projections: Vec<OrderProjection> =
            projector::project(&events).into_values().collect();
        projections.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(projections)
    }

    /// Completed orders: first occurrence per order in source order
    /// (time-descending). Deliberately no latest-wins re-check - the
    /// first completion row delivered represents the order.
    pub async fn completed_orders(&self) -> AppResult<Vec<OrderProjection>> {
        let filter = self.lookback_filter().status_eq(COMPLETED_STATUS);
        let events = self.log.fetch(&filter).await?;

        let mut seen: HashSet<&str> = HashSet::new();
        let mut orders = Vec::new();
        for event in &events {
            if seen.insert(&event.order_id) {
                orders.push(OrderProjection {
                    order_id: event.order_id.clone(),
                    order_number: event.order_number.clone(),
                    occurred_at: event.occurred_at,
                    payload: EventPayload::parse_or_default(&event.payload),
                });
            }
        }
        Ok(orders)
    }

    /// Audit trail of events whose status contains `needle`
    /// (case-sensitive). Every matching event is a row, several per
    /// order allowed; capped at [`STATUS_FILTER_CAP`].
    pub async fn filter_by_status(&self, needle: &str) -> AppResult<StatusFilterPage> {
        let filter = self.lookback_filter().status_like(needle);
        let mut rows = self.log.fetch(&filter).await?;
        let remainder = rows.len().saturating_sub(STATUS_FILTER_CAP);
        rows.truncate(STATUS_FILTER_CAP);
        Ok(StatusFilterPage { rows, remainder })
    }

    /// Orders flagged without a loading photo, newest first, capped at
    /// [`MISSING_PHOTO_CAP`]
    pub async fn missing_photos(&self) -> AppResult<Vec<OrderEvent>> {
        let filter = self
            .lookback_filter()
            .event_type_eq(event_type::MISSING_PHOTO);
        let mut rows = self.log.fetch(&filter).await?;
        rows.truncate(MISSING_PHOTO_CAP);
        Ok(rows)
    }

    /// Deadline events inside [start of today, today + look-ahead],
    /// soonest first
    pub async fn upcoming_deadlines(&self) -> AppResult<Vec<OrderEvent>> {
        let from = time::start_of_today_millis();
        let to = from + self.upcoming_days * time::DAY_MS;
        let filter = EventFilter::window(from, to)
            .event_type_eq(event_type::UPCOMING_DEADLINE)
            .ascending();
        self.log.fetch(&filter).await
    }

    /// Per-event-type counts over the last 7 days, busiest first.
    /// Ties break alphabetically so the listing is stable.
    pub async fn weekly_activity(&self) -> AppResult<Vec<(String, usize)>> {
        let filter = EventFilter::window(time::days_ago_millis(7), now_millis());
        let events = self.log.fetch(&filter).await?;

        let mut counts: HashMap<String, usize> = HashMap::new();
        for event in &events {
            *counts.entry(event.event_type.clone()).or_insert(0) += 1;
        }
        let mut activity: Vec<(String, usize)> = counts.into_iter().collect();
        activity.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(activity)
    }

    /// Look-back totals plus the most recent events
    pub async fn activity_summary(&self) -> AppResult<ActivitySummary> {
        let events = self.log.fetch(&self.lookback_filter()).await?;
        let completed_events = events
            .iter()
            .filter(|e| EventPayload::parse_or_default(&e.payload).status == COMPLETED_STATUS)
            .count();
        let recent = events.iter().take(SUMMARY_RECENT_EVENTS).cloned().collect();
        Ok(ActivitySummary {
            window_days: self.lookback_days,
            total_events: events.len(),
            completed_events,
            recent,
        })
    }

    /// All-time event count
    pub async fn total_events(&self) -> AppResult<u64> {
        self.log.count().await
    }
}
