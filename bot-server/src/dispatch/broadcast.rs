//! Ad-hoc broadcast - immediate fan-out to every registered recipient
//!
//! Administrator-triggered, synchronous, nothing persisted: one
//! delivery attempt per recipient, failures counted but never aborting
//! the rest of the list.

use std::collections::HashSet;
use std::sync::Arc;

use crate::gateway::MessagingGateway;
use crate::store::RecipientRegistry;
use crate::utils::{AppError, AppResult};

/// Final tally reported to the requester.
///
/// `sent_count + failed_count` always equals the number of recipients
/// contacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub sent_count: usize,
    pub failed_count: usize,
}

pub struct Broadcaster {
    recipients: Arc<dyn RecipientRegistry>,
    gateway: Arc<dyn MessagingGateway>,
    admin_ids: HashSet<i64>,
}

impl Broadcaster {
    pub fn new(
        recipients: Arc<dyn RecipientRegistry>,
        gateway: Arc<dyn MessagingGateway>,
        admin_ids: HashSet<i64>,
    ) -> Self {
        Self {
            recipients,
            gateway,
            admin_ids,
        }
    }

    /// Fan `text` out to every registered recipient.
    ///
    /// Rejects non-administrators before touching the registry - no
    /// data access, no side effect.
    pub async fn broadcast(&self, sender_id: i64, text: &str) -> AppResult<BroadcastReport> {
        if !self.admin_ids.contains(&sender_id) {
            return Err(AppError::Unauthorized);
        }

        let recipients = self.recipients.list_all().await?;
        let total = recipients.len();
        let mut report = BroadcastReport {
            sent_count: 0,
            failed_count: 0,
        };

        for recipient_id in recipients {
            match self.gateway.send_message(recipient_id, text).await {
                Ok(()) => report.sent_count += 1,
                Err(e) => {
                    report.failed_count += 1;
                    tracing::warn!(recipient = recipient_id, "Broadcast delivery failed: {e}");
                }
            }
        }

        tracing::info!(
            total,
            sent = report.sent_count,
            failed = report.failed_count,
            "Broadcast complete"
        );
        Ok(report)
    }
}
