//! Queued notification delivery tasks

use serde::{Deserialize, Serialize};

/// Delivery state machine: `pending` -> `sent`.
///
/// There is deliberately no failed state. A failed delivery leaves the
/// task `pending` so the next poll cycle retries it; adding bounded
/// retry or dead-lettering would be an explicit extension, not a quiet
/// change here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Sent,
}

/// A queued, recipient-targeted message awaiting delivery.
///
/// Rows are created by external producers in state `pending`; this
/// service only transitions them to `sent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationTask {
    pub id: i64,
    pub recipient_id: i64,
    pub message_text: String,
    pub status: TaskStatus,
    pub created_at: i64,
    /// Set once, on the transition to `sent`
    pub sent_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(serde_json::to_string(&TaskStatus::Sent).unwrap(), "\"sent\"");
    }
}
