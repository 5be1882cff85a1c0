//! Shared types for the order notification service
//!
//! Data model used by the bot server and its tests: order lifecycle
//! events, derived projections, notification tasks and recipients,
//! plus small cross-crate utilities.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::MalformedPayload;
pub use models::{
    EventPayload, NotificationTask, OrderEvent, OrderProjection, Recipient, TaskStatus,
};
