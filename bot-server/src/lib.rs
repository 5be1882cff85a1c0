//! Order notification bot server
//!
//! Notification and reporting assistant for a logistics operation. It
//! projects the append-only order event stream into a current-state view
//! per order, answers on-demand query commands, and delivers queued and
//! ad-hoc notifications to registered recipients.
//!
//! # Module structure
//!
//! ```text
//! bot-server/src/
//! ├── core/          # configuration, state, server loop, background tasks
//! ├── store/         # external store contracts + memory / supabase adapters
//! ├── gateway/       # outbound messaging (telegram / memory)
//! ├── orders/        # event projection and query engine
//! ├── dispatch/      # queued delivery worker + ad-hoc broadcast
//! ├── commands/      # command parsing, routing, rendering
//! └── utils/         # errors, logging, time helpers
//! ```
//!
//! The event log, notification queue and recipient registry are owned
//! by an external store; this service reads them through narrow traits
//! and recomputes every view from a fresh fetch, so no in-process state
//! needs locking.

pub mod commands;
pub mod core;
pub mod dispatch;
pub mod gateway;
pub mod orders;
pub mod store;
pub mod utils;

// Re-export public types
pub use crate::core::{BotServer, BotState, Config};
pub use crate::orders::OrderQueryEngine;
pub use crate::utils::{AppError, AppResult};
