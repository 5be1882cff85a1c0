//! Unified error handling
//!
//! Application error taxonomy. None of these kinds are fatal to the
//! process: each query or dispatch operation catches at its own
//! boundary and reports a generic failure to the caller, and the
//! scheduled worker just skips to its next cycle.

use thiserror::Error;

/// Application error enumeration
#[derive(Debug, Error)]
pub enum AppError {
    /// Event log, task store or registry call failed (network/storage)
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// An event payload could not be interpreted; consumers substitute
    /// defaults and continue
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// A single recipient delivery failed
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// Caller lacks administrator rights for a gated operation
    #[error("Administrator rights required")]
    Unauthorized,

    /// Invalid request or configuration value
    #[error("Invalid: {0}")]
    Invalid(String),

    /// Unexpected internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable(msg.into())
    }

    pub fn malformed_payload(msg: impl Into<String>) -> Self {
        Self::MalformedPayload(msg.into())
    }

    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<shared::MalformedPayload> for AppError {
    fn from(e: shared::MalformedPayload) -> Self {
        AppError::MalformedPayload(e.to_string())
    }
}
