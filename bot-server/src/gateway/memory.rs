//! In-process gateway for tests
//!
//! Records every send and can be scripted to fail for specific
//! recipients, so delivery accounting is observable without a network.

use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;

use super::MessagingGateway;
use crate::utils::{AppError, AppResult};

#[derive(Default)]
pub struct MemoryGateway {
    sent: RwLock<Vec<(i64, String)>>,
    failing: RwLock<HashSet<i64>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `recipient_id` fail until cleared
    pub async fn fail_recipient(&self, recipient_id: i64) {
        self.failing.write().await.insert(recipient_id);
    }

    pub async fn clear_failure(&self, recipient_id: i64) {
        self.failing.write().await.remove(&recipient_id);
    }

    /// Every `(recipient, text)` pair delivered so far, in send order
    pub async fn sent(&self) -> Vec<(i64, String)> {
        self.sent.read().await.clone()
    }

    pub async fn sent_to(&self, recipient_id: i64) -> usize {
        self.sent
            .read()
            .await
            .iter()
            .filter(|(id, _)| *id == recipient_id)
            .count()
    }
}

#[async_trait]
impl MessagingGateway for MemoryGateway {
    async fn send_message(&self, recipient_id: i64, text: &str) -> AppResult<()> {
        if self.failing.read().await.contains(&recipient_id) {
            return Err(AppError::delivery(format!(
                "scripted failure for recipient {recipient_id}"
            )));
        }
        self.sent
            .write()
            .await
            .push((recipient_id, text.to_string()));
        Ok(())
    }
}
