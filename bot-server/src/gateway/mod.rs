//! Outbound messaging
//!
//! [`MessagingGateway`] is the single-attempt send seam: one call, one
//! delivery attempt, may fail for transport or invalid-recipient
//! reasons. Retry policy belongs to the caller (the queued-delivery
//! worker retries via task state; broadcast does not retry at all).

pub mod memory;
pub mod telegram;

pub use memory::MemoryGateway;
pub use telegram::TelegramGateway;

use async_trait::async_trait;

use crate::utils::AppResult;

/// Send a text message to one recipient
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send_message(&self, recipient_id: i64, text: &str) -> AppResult<()>;
}
