//! Order event projection and queries

pub mod projector;
pub mod queries;

pub use queries::{ActivitySummary, OrderQueryEngine, StatusFilterPage};
