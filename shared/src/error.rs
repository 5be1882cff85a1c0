//! Error types for the shared crate

use thiserror::Error;

/// An event payload could not be interpreted as the expected structure.
///
/// Non-fatal by policy: consumers substitute [`EventPayload::default`]
/// for the whole payload and keep processing the remaining events.
///
/// [`EventPayload::default`]: crate::models::EventPayload
#[derive(Debug, Error)]
#[error("malformed event payload: {0}")]
pub struct MalformedPayload(pub String);
