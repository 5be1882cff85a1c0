//! In-memory store implementations
//!
//! In-process twins of the external stores, used by tests and by demo
//! mode. Filter and ordering semantics must match the contracts in the
//! parent module exactly - the integration tests rely on it.

use async_trait::async_trait;
use shared::models::{NotificationTask, OrderEvent, Recipient, TaskStatus};
use tokio::sync::RwLock;

use super::{EventFilter, EventLog, RecipientRegistry, SortOrder, TaskStore};
use crate::utils::{AppError, AppResult};

/// Append-only event log held in memory
#[derive(Default)]
pub struct MemoryEventLog {
    events: RwLock<Vec<OrderEvent>>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, event: OrderEvent) {
        self.events.write().await.push(event);
    }

    pub async fn extend(&self, events: impl IntoIterator<Item = OrderEvent>) {
        self.events.write().await.extend(events);
    }
}

#[async_trait]
impl EventLog for MemoryEventLog {
    async fn fetch(&self, filter: &EventFilter) -> AppResult<Vec<OrderEvent>> {
        let events = self.events.read().await;
        let mut matched: Vec<OrderEvent> = events
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        // Stable sort: equal timestamps keep insertion order, which is
        // what "input order delivered by the source" means here
        match filter.order {
            SortOrder::Asc => matched.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at)),
            SortOrder::Desc => matched.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at)),
        }
        Ok(matched)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.events.read().await.len() as u64)
    }
}

/// Notification queue held in memory
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<Vec<NotificationTask>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, task: NotificationTask) {
        self.tasks.write().await.push(task);
    }

    /// Snapshot of every task, for test assertions
    pub async fn all(&self) -> Vec<NotificationTask> {
        self.tasks.read().await.clone()
    }

    pub async fn get(&self, task_id: i64) -> Option<NotificationTask> {
        self.tasks
            .read()
            .await
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn fetch_pending(&self, limit: usize) -> AppResult<Vec<NotificationTask>> {
        let tasks = self.tasks.read().await;
        let mut pending: Vec<NotificationTask> = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        pending.truncate(limit);
        Ok(pending)
    }

    async fn mark_sent(&self, task_id: i64, sent_at: i64) -> AppResult<()> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| AppError::invalid(format!("task {task_id} not found")))?;
        task.status = TaskStatus::Sent;
        task.sent_at = Some(sent_at);
        Ok(())
    }
}

/// Recipient registry held in memory
#[derive(Default)]
pub struct MemoryRecipientRegistry {
    recipients: RwLock<Vec<Recipient>>,
}

impl MemoryRecipientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, recipient: Recipient) {
        self.recipients.write().await.push(recipient);
    }

    /// Convenience seeding for tests: ids only, no profile data
    pub async fn seed_ids(&self, ids: impl IntoIterator<Item = i64>) {
        for id in ids {
            self.seed(Recipient {
                recipient_id: id,
                username: None,
                first_name: None,
                last_name: None,
                is_admin: false,
            })
            .await;
        }
    }
}

#[async_trait]
impl RecipientRegistry for MemoryRecipientRegistry {
    async fn list_all(&self) -> AppResult<Vec<i64>> {
        Ok(self
            .recipients
            .read()
            .await
            .iter()
            .map(|r| r.recipient_id)
            .collect())
    }

    async fn is_registered(&self, recipient_id: i64) -> AppResult<bool> {
        Ok(self
            .recipients
            .read()
            .await
            .iter()
            .any(|r| r.recipient_id == recipient_id))
    }

    async fn upsert_if_absent(&self, recipient: &Recipient) -> AppResult<bool> {
        let mut recipients = self.recipients.write().await;
        if recipients
            .iter()
            .any(|r| r.recipient_id == recipient.recipient_id)
        {
            return Ok(false);
        }
        recipients.push(recipient.clone());
        Ok(true)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.recipients.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(id: i64, occurred_at: i64) -> OrderEvent {
        OrderEvent {
            id,
            order_id: format!("o{id}"),
            order_number: None,
            event_type: "STATUS_CHANGED".to_string(),
            occurred_at,
            payload: json!({}),
        }
    }

    fn task(id: i64, created_at: i64) -> NotificationTask {
        NotificationTask {
            id,
            recipient_id: 100 + id,
            message_text: format!("message {id}"),
            status: TaskStatus::Pending,
            created_at,
            sent_at: None,
        }
    }

    #[tokio::test]
    async fn fetch_orders_descending_with_stable_ties() {
        let log = MemoryEventLog::new();
        log.extend([event(1, 50), event(2, 100), event(3, 100), event(4, 10)])
            .await;

        let fetched = log
            .fetch(&EventFilter::window(0, 1000))
            .await
            .unwrap();
        let ids: Vec<i64> = fetched.iter().map(|e| e.id).collect();
        // Equal timestamps keep insertion order (2 before 3)
        assert_eq!(ids, vec![2, 3, 1, 4]);
    }

    #[tokio::test]
    async fn fetch_pending_is_oldest_first_and_bounded() {
        let store = MemoryTaskStore::new();
        store.seed(task(1, 300)).await;
        store.seed(task(2, 100)).await;
        store.seed(task(3, 200)).await;

        let batch = store.fetch_pending(2).await.unwrap();
        let ids: Vec<i64> = batch.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn mark_sent_transitions_and_sets_timestamp() {
        let store = MemoryTaskStore::new();
        store.seed(task(7, 100)).await;

        store.mark_sent(7, 12345).await.unwrap();
        let updated = store.get(7).await.unwrap();
        assert_eq!(updated.status, TaskStatus::Sent);
        assert_eq!(updated.sent_at, Some(12345));

        assert!(store.fetch_pending(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upsert_if_absent_inserts_once() {
        let registry = MemoryRecipientRegistry::new();
        let recipient = Recipient {
            recipient_id: 42,
            username: Some("ops".to_string()),
            first_name: None,
            last_name: None,
            is_admin: false,
        };

        assert!(registry.upsert_if_absent(&recipient).await.unwrap());
        assert!(!registry.upsert_if_absent(&recipient).await.unwrap());
        assert_eq!(registry.count().await.unwrap(), 1);
        assert!(registry.is_registered(42).await.unwrap());
    }
}
