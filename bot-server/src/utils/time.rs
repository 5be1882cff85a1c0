//! Time helpers
//!
//! All in-process timestamps are Unix milliseconds. ISO-8601 strings
//! appear only at the PostgREST wire boundary; conversion lives here.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use shared::util::now_millis;

/// One day in milliseconds
pub const DAY_MS: i64 = 86_400_000;

/// Lower window bound `days` back from now
pub fn days_ago_millis(days: i64) -> i64 {
    (Utc::now() - Duration::days(days)).timestamp_millis()
}

/// Midnight UTC of the current day
pub fn start_of_today_millis() -> i64 {
    let now = now_millis();
    now - now.rem_euclid(DAY_MS)
}

/// Millis -> RFC 3339 string for outbound store filters/updates.
/// Out-of-range values clamp to the epoch rather than failing the call.
pub fn millis_to_iso(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .to_rfc3339()
}

/// ISO-8601 -> millis for inbound store rows.
///
/// The store emits both offset-carrying and naive timestamps; naive
/// values are read as UTC.
pub fn iso_to_millis(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// Millis -> `YYYY-MM-DD` for display
pub fn millis_to_date(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .format("%Y-%m-%d")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_roundtrip() {
        let ms = 1_754_000_000_123;
        let parsed = iso_to_millis(&millis_to_iso(ms)).unwrap();
        assert_eq!(parsed, ms);
    }

    #[test]
    fn iso_without_offset_is_utc() {
        assert_eq!(iso_to_millis("1970-01-01T00:00:01.500"), Some(1_500));
        assert_eq!(iso_to_millis("1970-01-01T00:00:01"), Some(1_000));
    }

    #[test]
    fn iso_garbage_is_none() {
        assert_eq!(iso_to_millis("yesterday"), None);
    }

    #[test]
    fn date_formatting() {
        assert_eq!(millis_to_date(0), "1970-01-01");
        assert_eq!(millis_to_date(DAY_MS + 3600_000), "1970-01-02");
    }

    #[test]
    fn start_of_today_is_midnight() {
        let start = start_of_today_millis();
        assert_eq!(start % DAY_MS, 0);
        assert!(start <= now_millis());
        assert!(now_millis() - start < DAY_MS);
    }
}
