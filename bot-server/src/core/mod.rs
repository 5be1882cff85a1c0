//! Configuration, shared state and the server runtime

pub mod config;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use server::BotServer;
pub use state::BotState;
pub use tasks::BackgroundTasks;
