//! Application result alias

use super::error::AppError;

/// Result alias used across the service
pub type AppResult<T> = Result<T, AppError>;
