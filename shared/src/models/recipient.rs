//! Registered message recipients

use serde::{Deserialize, Serialize};

/// One registry entry. Registration happens on first contact; the
/// admin flag is derived from the static allow-list at that moment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub recipient_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Static membership in the configured administrator set
    pub is_admin: bool,
}
