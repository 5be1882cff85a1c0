//! Notification delivery
//!
//! Two independent paths share the outbound messaging gateway: the
//! scheduled worker drains the persistent task queue on a fixed
//! cadence; broadcast fans a message out to every recipient
//! immediately, with nothing persisted.

pub mod broadcast;
pub mod worker;

pub use broadcast::{BroadcastReport, Broadcaster};
pub use worker::{CycleStats, NotificationWorker};
