//! Utility functions and shared infrastructure

pub mod error;
pub mod logger;
pub mod result;
pub mod time;

pub use error::AppError;
pub use result::AppResult;
