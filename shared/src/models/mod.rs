//! Data models
//!
//! Events, tasks and recipients are rows owned by the external store;
//! this service reads them and (for tasks) flips delivery status only.
//! The projection is derived in-process and never persisted.
//! All timestamps are Unix milliseconds (i64).

pub mod event;
pub mod projection;
pub mod recipient;
pub mod task;

// Re-exports
pub use event::*;
pub use projection::*;
pub use recipient::*;
pub use task::*;
