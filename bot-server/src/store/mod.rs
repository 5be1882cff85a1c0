//! Contracts for the externally owned stores
//!
//! The event log, notification queue and recipient registry live in an
//! external store that is assumed to be correctly synchronized for
//! concurrent access. This service reads them through the narrow traits
//! below and treats every fetch as an independent snapshot; it never
//! holds cross-call locks.
//!
//! | Module | Role |
//! |--------|------|
//! | [`memory`] | in-process twins for tests and demo mode |
//! | [`supabase`] | PostgREST adapter for the production store |

pub mod memory;
pub mod supabase;

pub use memory::{MemoryEventLog, MemoryRecipientRegistry, MemoryTaskStore};
pub use supabase::SupabaseStore;

use async_trait::async_trait;
use shared::models::{EventPayload, NotificationTask, OrderEvent, Recipient};

use crate::utils::AppResult;

/// Sort direction over `occurred_at`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Time-windowed, filtered event query.
///
/// Window bounds are inclusive Unix milliseconds. Status filters apply
/// to `payload.status` after the default-substitution policy, so a
/// malformed payload reads as the empty status.
#[derive(Debug, Clone)]
pub struct EventFilter {
    pub from: i64,
    pub to: i64,
    pub event_type_eq: Option<String>,
    pub event_type_ne: Option<String>,
    /// Exact match on `payload.status`
    pub status_eq: Option<String>,
    /// Case-sensitive containment on `payload.status`
    pub status_like: Option<String>,
    pub order: SortOrder,
}

impl EventFilter {
    /// Filter covering `[from, to]`, newest first, no other constraints
    pub fn window(from: i64, to: i64) -> Self {
        Self {
            from,
            to,
            event_type_eq: None,
            event_type_ne: None,
            status_eq: None,
            status_like: None,
            order: SortOrder::Desc,
        }
    }

    pub fn event_type_eq(mut self, event_type: impl Into<String>) -> Self {
        self.event_type_eq = Some(event_type.into());
        self
    }

    pub fn event_type_ne(mut self, event_type: impl Into<String>) -> Self {
        self.event_type_ne = Some(event_type.into());
        self
    }

    pub fn status_eq(mut self, status: impl Into<String>) -> Self {
        self.status_eq = Some(status.into());
        self
    }

    pub fn status_like(mut self, needle: impl Into<String>) -> Self {
        self.status_like = Some(needle.into());
        self
    }

    pub fn ascending(mut self) -> Self {
        self.order = SortOrder::Asc;
        self
    }

    /// Reference matching semantics; the memory store applies this
    /// directly and the supabase adapter must translate it faithfully.
    pub fn matches(&self, event: &OrderEvent) -> bool {
        if event.occurred_at < self.from || event.occurred_at > self.to {
            return false;
        }
        if let Some(t) = &self.event_type_eq
            && event.event_type != *t
        {
            return false;
        }
        if let Some(t) = &self.event_type_ne
            && event.event_type == *t
        {
            return false;
        }
        if self.status_eq.is_some() || self.status_like.is_some() {
            let status = EventPayload::parse_or_default(&event.payload).status;
            if let Some(s) = &self.status_eq
                && status != *s
            {
                return false;
            }
            if let Some(s) = &self.status_like
                && !status.contains(s.as_str())
            {
                return false;
            }
        }
        true
    }
}

/// Read side of the append-only order event log
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Fetch events matching `filter`, ordered by `occurred_at`
    async fn fetch(&self, filter: &EventFilter) -> AppResult<Vec<OrderEvent>>;

    /// Total number of events in the log (all time)
    async fn count(&self) -> AppResult<u64>;
}

/// Pending-task queue; this service only flips status to `sent`
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Up to `limit` tasks in state `pending`, oldest `created_at` first
    async fn fetch_pending(&self, limit: usize) -> AppResult<Vec<NotificationTask>>;

    /// Transition one task to `sent` and record the delivery time
    async fn mark_sent(&self, task_id: i64, sent_at: i64) -> AppResult<()>;
}

/// Recipient identities and registration
#[async_trait]
pub trait RecipientRegistry: Send + Sync {
    /// Every registered recipient identifier
    async fn list_all(&self) -> AppResult<Vec<i64>>;

    async fn is_registered(&self, recipient_id: i64) -> AppResult<bool>;

    /// Insert on first contact; returns true when a new row was created
    async fn upsert_if_absent(&self, recipient: &Recipient) -> AppResult<bool>;

    /// Number of registered recipients
    async fn count(&self) -> AppResult<u64>;
}
