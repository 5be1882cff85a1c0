//! Supabase (PostgREST) store adapter
//!
//! The production event log, notification queue and recipient registry
//! live in a Supabase project owned by the sync pipeline. This adapter
//! only translates the trait contracts into PostgREST requests; schema
//! and persistence belong to the owner, not to this service.
//!
//! | Table | Contract |
//! |-------|----------|
//! | `cloud_sync_log` | [`EventLog`] |
//! | `notifications_queue` | [`TaskStore`] |
//! | `bot_users` | [`RecipientRegistry`] |
//!
//! Timestamps cross this boundary as ISO-8601 and are converted to Unix
//! milliseconds on the way in.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use shared::models::{NotificationTask, OrderEvent, Recipient, TaskStatus};
use std::time::Duration;

use super::{EventFilter, EventLog, RecipientRegistry, SortOrder, TaskStore};
use crate::utils::{AppError, AppResult, time};

const EVENTS_TABLE: &str = "cloud_sync_log";
const TASKS_TABLE: &str = "notifications_queue";
const RECIPIENTS_TABLE: &str = "bot_users";

/// Bounded per-call timeout; a stalled store call fails the operation
/// instead of blocking its task forever
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// PostgREST client for the externally owned store.
///
/// One instance implements all three store contracts; clone the `Arc`
/// and coerce per trait.
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/rest/v1/{table}", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn get_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> AppResult<Vec<T>> {
        let response = self
            .request(Method::GET, table)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::source_unavailable(format!("{table} fetch failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::source_unavailable(format!("{table} fetch rejected: {e}")))?;
        response
            .json()
            .await
            .map_err(|e| AppError::source_unavailable(format!("{table} response invalid: {e}")))
    }

    /// Exact row count without fetching rows (`Prefer: count=exact`,
    /// parsed from the `Content-Range` header)
    async fn count_rows(&self, table: &str) -> AppResult<u64> {
        let response = self
            .request(Method::GET, table)
            .query(&[("select", "id")])
            .header("Prefer", "count=exact")
            .header("Range", "0-0")
            .send()
            .await
            .map_err(|e| AppError::source_unavailable(format!("{table} count failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::source_unavailable(format!("{table} count rejected: {e}")))?;

        let total = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit('/').next())
            .and_then(|total| total.parse::<u64>().ok())
            .unwrap_or(0);
        Ok(total)
    }
}

// ========== Row types (wire shape of the external tables) ==========

/// `order_id` / `order_number` columns carry numbers in old rows and
/// strings in new ones; normalize to a string identifier
fn id_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct EventRow {
    id: i64,
    order_id: serde_json::Value,
    #[serde(default)]
    order_number: Option<serde_json::Value>,
    event_type: String,
    created_at: String,
    #[serde(default)]
    event_data: serde_json::Value,
}

impl EventRow {
    fn into_event(self) -> OrderEvent {
        OrderEvent {
            id: self.id,
            order_id: id_string(&self.order_id),
            order_number: self.order_number.as_ref().map(id_string),
            event_type: self.event_type,
            occurred_at: time::iso_to_millis(&self.created_at).unwrap_or(0),
            payload: self.event_data,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TaskRow {
    id: i64,
    telegram_id: i64,
    message_text: String,
    status: TaskStatus,
    created_at: String,
    #[serde(default)]
    sent_at: Option<String>,
}

impl TaskRow {
    fn into_task(self) -> NotificationTask {
        NotificationTask {
            id: self.id,
            recipient_id: self.telegram_id,
            message_text: self.message_text,
            status: self.status,
            created_at: time::iso_to_millis(&self.created_at).unwrap_or(0),
            sent_at: self.sent_at.as_deref().and_then(time::iso_to_millis),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecipientIdRow {
    telegram_id: i64,
}

// ========== Trait implementations ==========

#[async_trait]
impl EventLog for SupabaseStore {
    async fn fetch(&self, filter: &EventFilter) -> AppResult<Vec<OrderEvent>> {
        let mut query: Vec<(&str, String)> = vec![
            ("select", "*".to_string()),
            ("created_at", format!("gte.{}", time::millis_to_iso(filter.from))),
            ("created_at", format!("lte.{}", time::millis_to_iso(filter.to))),
        ];
        if let Some(t) = &filter.event_type_eq {
            query.push(("event_type", format!("eq.{t}")));
        }
        if let Some(t) = &filter.event_type_ne {
            query.push(("event_type", format!("neq.{t}")));
        }
        if let Some(s) = &filter.status_eq {
            query.push(("event_data->>status", format!("eq.{s}")));
        }
        if let Some(s) = &filter.status_like {
            // PostgREST `like` with * wildcards is case-sensitive,
            // matching the containment contract
            query.push(("event_data->>status", format!("like.*{s}*")));
        }
        let direction = match filter.order {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        };
        query.push(("order", format!("created_at.{direction}")));

        let rows: Vec<EventRow> = self.get_rows(EVENTS_TABLE, &query).await?;
        Ok(rows.into_iter().map(EventRow::into_event).collect())
    }

    async fn count(&self) -> AppResult<u64> {
        self.count_rows(EVENTS_TABLE).await
    }
}

#[async_trait]
impl TaskStore for SupabaseStore {
    async fn fetch_pending(&self, limit: usize) -> AppResult<Vec<NotificationTask>> {
        let query: Vec<(&str, String)> = vec![
            ("select", "*".to_string()),
            ("status", "eq.pending".to_string()),
            ("order", "created_at.asc".to_string()),
            ("limit", limit.to_string()),
        ];
        let rows: Vec<TaskRow> = self.get_rows(TASKS_TABLE, &query).await?;
        Ok(rows.into_iter().map(TaskRow::into_task).collect())
    }

    async fn mark_sent(&self, task_id: i64, sent_at: i64) -> AppResult<()> {
        self.request(Method::PATCH, TASKS_TABLE)
            .query(&[("id", format!("eq.{task_id}"))])
            .header("Prefer", "return=minimal")
            .json(&json!({
                "status": "sent",
                "sent_at": time::millis_to_iso(sent_at),
            }))
            .send()
            .await
            .map_err(|e| AppError::source_unavailable(format!("mark_sent failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::source_unavailable(format!("mark_sent rejected: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl RecipientRegistry for SupabaseStore {
    async fn list_all(&self) -> AppResult<Vec<i64>> {
        let query: Vec<(&str, String)> = vec![("select", "telegram_id".to_string())];
        let rows: Vec<RecipientIdRow> = self.get_rows(RECIPIENTS_TABLE, &query).await?;
        Ok(rows.into_iter().map(|r| r.telegram_id).collect())
    }

    async fn is_registered(&self, recipient_id: i64) -> AppResult<bool> {
        let query: Vec<(&str, String)> = vec![
            ("select", "telegram_id".to_string()),
            ("telegram_id", format!("eq.{recipient_id}")),
            ("limit", "1".to_string()),
        ];
        let rows: Vec<RecipientIdRow> = self.get_rows(RECIPIENTS_TABLE, &query).await?;
        Ok(!rows.is_empty())
    }

    async fn upsert_if_absent(&self, recipient: &Recipient) -> AppResult<bool> {
        if self.is_registered(recipient.recipient_id).await? {
            return Ok(false);
        }
        self.request(Method::POST, RECIPIENTS_TABLE)
            .header("Prefer", "return=minimal")
            .json(&json!({
                "telegram_id": recipient.recipient_id,
                "username": recipient.username,
                "first_name": recipient.first_name,
                "last_name": recipient.last_name,
                "is_admin": recipient.is_admin,
            }))
            .send()
            .await
            .map_err(|e| AppError::source_unavailable(format!("registration failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::source_unavailable(format!("registration rejected: {e}")))?;
        Ok(true)
    }

    async fn count(&self) -> AppResult<u64> {
        self.count_rows(RECIPIENTS_TABLE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_row_normalizes_numeric_ids() {
        let row: EventRow = serde_json::from_value(json!({
            "id": 9,
            "order_id": 1234,
            "order_number": "MLS-0012",
            "event_type": "STATUS_CHANGED",
            "created_at": "1970-01-01T00:00:02Z",
            "event_data": {"status": "New"}
        }))
        .unwrap();
        let event = row.into_event();
        assert_eq!(event.order_id, "1234");
        assert_eq!(event.order_number.as_deref(), Some("MLS-0012"));
        assert_eq!(event.occurred_at, 2_000);
    }

    #[test]
    fn task_row_maps_recipient_and_times() {
        let row: TaskRow = serde_json::from_value(json!({
            "id": 3,
            "telegram_id": 777,
            "message_text": "order update",
            "status": "pending",
            "created_at": "1970-01-01T00:00:01Z",
            "sent_at": null
        }))
        .unwrap();
        let task = row.into_task();
        assert_eq!(task.recipient_id, 777);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.created_at, 1_000);
        assert_eq!(task.sent_at, None);
    }
}
