//! Service configuration
//!
//! Every knob comes from the environment with a default:
//!
//! | Env var | Default | Meaning |
//! |---------|---------|---------|
//! | TELEGRAM_TOKEN | (required) | Bot API token |
//! | SUPABASE_URL | (required) | Store base URL |
//! | SUPABASE_KEY | (required) | Store API key |
//! | ADMIN_IDS | `[]` | JSON array of administrator recipient ids |
//! | DISPATCH_INTERVAL_SECS | 30 | Delivery worker cadence |
//! | DISPATCH_INITIAL_DELAY_SECS | 10 | Delay before the first cycle |
//! | DISPATCH_BATCH_SIZE | 10 | Pending tasks fetched per cycle |
//! | LOOKBACK_DAYS | 30 | Query window for order views |
//! | UPCOMING_DAYS | 7 | Look-ahead for deadline events |
//! | MESSAGE_CHUNK_CHARS | 4000 | Outbound message chunk size |
//! | UPDATE_POLL_TIMEOUT_SECS | 30 | Long-poll timeout for updates |

use std::collections::HashSet;
use std::str::FromStr;

/// Immutable service configuration, injected at construction - the
/// admin allow-list in particular is explicit state here, not ambient
/// globals.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    pub supabase_url: String,
    pub supabase_key: String,
    /// Static administrator allow-list; authorization is containment
    pub admin_ids: HashSet<i64>,
    pub dispatch_interval_secs: u64,
    pub dispatch_initial_delay_secs: u64,
    pub dispatch_batch_size: usize,
    pub lookback_days: i64,
    pub upcoming_days: i64,
    pub message_chunk_chars: usize,
    pub update_poll_timeout_secs: u64,
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            telegram_token: std::env::var("TELEGRAM_TOKEN").unwrap_or_default(),
            supabase_url: std::env::var("SUPABASE_URL").unwrap_or_default(),
            supabase_key: std::env::var("SUPABASE_KEY").unwrap_or_default(),
            admin_ids: parse_admin_ids(&std::env::var("ADMIN_IDS").unwrap_or_else(|_| "[]".into())),
            dispatch_interval_secs: var_or("DISPATCH_INTERVAL_SECS", 30),
            dispatch_initial_delay_secs: var_or("DISPATCH_INITIAL_DELAY_SECS", 10),
            dispatch_batch_size: var_or("DISPATCH_BATCH_SIZE", 10),
            lookback_days: var_or("LOOKBACK_DAYS", 30),
            upcoming_days: var_or("UPCOMING_DAYS", 7),
            message_chunk_chars: var_or("MESSAGE_CHUNK_CHARS", 4000),
            update_poll_timeout_secs: var_or("UPDATE_POLL_TIMEOUT_SECS", 30),
        }
    }

    pub fn is_admin(&self, recipient_id: i64) -> bool {
        self.admin_ids.contains(&recipient_id)
    }
}

impl Default for Config {
    /// Defaults without touching the environment; used by tests
    fn default() -> Self {
        Self {
            telegram_token: String::new(),
            supabase_url: String::new(),
            supabase_key: String::new(),
            admin_ids: HashSet::new(),
            dispatch_interval_secs: 30,
            dispatch_initial_delay_secs: 10,
            dispatch_batch_size: 10,
            lookback_days: 30,
            upcoming_days: 7,
            message_chunk_chars: 4000,
            update_poll_timeout_secs: 30,
        }
    }
}

fn var_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// `ADMIN_IDS` is a JSON array, e.g. `[123456789, 987654321]`.
/// A malformed value means an empty allow-list, not a crash.
fn parse_admin_ids(raw: &str) -> HashSet<i64> {
    match serde_json::from_str::<Vec<i64>>(raw) {
        Ok(ids) => ids.into_iter().collect(),
        Err(e) => {
            tracing::warn!("ADMIN_IDS is not a JSON array of ids ({e}), no administrators");
            HashSet::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_ids_parse_json_array() {
        let ids = parse_admin_ids("[1, 2, 3]");
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&2));
    }

    #[test]
    fn malformed_admin_ids_mean_no_admins() {
        assert!(parse_admin_ids("not json").is_empty());
        assert!(parse_admin_ids("{\"a\": 1}").is_empty());
    }

    #[test]
    fn is_admin_is_containment() {
        let config = Config {
            admin_ids: [7].into_iter().collect(),
            ..Config::default()
        };
        assert!(config.is_admin(7));
        assert!(!config.is_admin(8));
    }
}
