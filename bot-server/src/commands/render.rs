//! Plain-text rendering of query results
//!
//! Deliberately dumb formatting glue: numbered entries, `YYYY-MM-DD`
//! dates, empty-field fallbacks. The only piece with behavior worth
//! testing is [`chunk_message`].

use shared::models::{OrderEvent, OrderProjection};

use crate::dispatch::BroadcastReport;
use crate::orders::{ActivitySummary, StatusFilterPage};
use crate::utils::time::millis_to_date;

/// Generic reply for any operation that failed at the store boundary
pub const GENERIC_FAILURE: &str = "❌ Failed to fetch data";

pub const ADMIN_ONLY: &str = "⛔ This command is for administrators only";

/// Split rendered text into fixed-size character chunks for transports
/// with a message size limit. A chunk boundary may fall inside a
/// logical entry; that is accepted behavior for oversized listings, not
/// a bug to fix here.
pub fn chunk_message(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn or_fallback<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

pub fn welcome(first_name: Option<&str>) -> String {
    format!(
        "👋 Hi, {}!\n\n\
         I track logistics orders for Margiana Logistic Services.\n\n\
         📋 Available commands:\n\
         /orders - Active orders\n\
         /completed - Completed orders (last 30 days)\n\
         /status <text> - Orders by status\n\
         /missing_photos - Orders without loading photos\n\
         /upcoming - Upcoming events (7 days)\n\
         /report - Activity summary\n\
         /help - Help\n\n\
         🔔 Queued notifications are delivered automatically.\n\n\
         Administrators additionally have /stats and /notify.",
        first_name.unwrap_or("there")
    )
}

pub fn help() -> String {
    "📖 Command help:\n\n\
     /orders - Show active orders\n\
     /completed - Completed orders over the last 30 days\n\
     /status <text> - Filter orders by status\n\
     \u{20}   Known statuses: New, In Progress CHN, In Transit CHN-IR,\n\
     \u{20}   In Progress IR, In Transit IR-TKM, Completed, Cancelled\n\
     /missing_photos - Orders without loading photos\n\
     /upcoming - Events for the next 7 days\n\
     /report - Activity summary\n\n\
     Examples:\n\
     /status \"In Transit CHN-IR\"\n\
     /status Completed\n\n\
     For administrators:\n\
     /stats - System statistics\n\
     /notify <text> - Send a notification to all recipients"
        .to_string()
}

pub fn unknown_command() -> String {
    "❓ Unknown command. Use /help for the list of commands.".to_string()
}

pub fn active_orders(orders: &[OrderProjection]) -> String {
    if orders.is_empty() {
        return "📭 No active orders found".to_string();
    }
    let mut lines = vec!["📋 Active orders:".to_string()];
    for (idx, order) in orders.iter().enumerate() {
        lines.push(format!(
            "\n{}. Order #{}\n\
             \u{20}  👤 Client: {}\n\
             \u{20}  📦 Containers: {}\n\
             \u{20}  ⚖️ Weight: {} kg\n\
             \u{20}  📍 Status: {}\n\
             \u{20}  🕐 Updated: {}",
            idx + 1,
            order.display_number(),
            or_fallback(&order.payload.client, "not specified"),
            order.payload.containers,
            order.payload.weight,
            or_fallback(&order.payload.status, "unknown"),
            millis_to_date(order.occurred_at),
        ));
    }
    lines.join("\n")
}

pub fn completed_orders(orders: &[OrderProjection]) -> String {
    if orders.is_empty() {
        return "✅ No completed orders in the last 30 days".to_string();
    }
    let mut lines = vec!["✅ Completed orders (30 days):".to_string()];
    for (idx, order) in orders.iter().enumerate() {
        lines.push(format!(
            "\n{}. #{} - {}\n\
             \u{20}  📅 Completed: {}\n\
             \u{20}  📦 Containers: {}\n\
             \u{20}  ⚖️ Weight: {} kg",
            idx + 1,
            order.display_number(),
            or_fallback(&order.payload.client, "client"),
            millis_to_date(order.occurred_at),
            order.payload.containers,
            order.payload.weight,
        ));
    }
    lines.join("\n")
}

pub fn status_usage() -> String {
    "ℹ️ Usage: /status <text>\n\
     Example: /status \"In Transit CHN-IR\"\n\n\
     Known statuses:\n\
     • New\n• In Progress CHN\n• In Transit CHN-IR\n\
     • In Progress IR\n• In Transit IR-TKM\n• Completed\n• Cancelled"
        .to_string()
}

pub fn status_results(needle: &str, page: &StatusFilterPage) -> String {
    if page.rows.is_empty() {
        return format!("📭 No orders with status '{needle}' found");
    }
    let mut lines = vec![format!("🔍 Orders with status '{needle}':")];
    for (idx, event) in page.rows.iter().enumerate() {
        let payload = event_payload(event);
        lines.push(format!(
            "\n{}. #{}\n\
             \u{20}  👤 {}\n\
             \u{20}  📦 {} container(s)\n\
             \u{20}  ⚖️ {} kg\n\
             \u{20}  🕐 {}",
            idx + 1,
            event.display_number(),
            or_fallback(&payload.client, "client"),
            payload.containers,
            payload.weight,
            millis_to_date(event.occurred_at),
        ));
    }
    if page.remainder > 0 {
        lines.push(format!("\n... and {} more", page.remainder));
    }
    lines.join("\n")
}

pub fn missing_photos(events: &[OrderEvent]) -> String {
    if events.is_empty() {
        return "✅ All orders have loading photos!".to_string();
    }
    let mut lines = vec!["📷 Orders without loading photos:".to_string()];
    for (idx, event) in events.iter().enumerate() {
        let payload = event_payload(event);
        lines.push(format!(
            "\n{}. #{}\n\
             \u{20}  👤 {}\n\
             \u{20}  📍 {}\n\
             \u{20}  🕐 {}",
            idx + 1,
            event.display_number(),
            or_fallback(&payload.client, "client"),
            or_fallback(&payload.status, "status unknown"),
            millis_to_date(event.occurred_at),
        ));
    }
    lines.join("\n")
}

pub fn upcoming(events: &[OrderEvent]) -> String {
    if events.is_empty() {
        return "📅 No upcoming events for the next week".to_string();
    }
    let mut lines = vec!["📅 Upcoming events (7 days):".to_string()];
    for event in events {
        let payload = event_payload(event);
        lines.push(format!(
            "\n📌 {}\n\
             \u{20}  Order: #{}\n\
             \u{20}  Date: {}\n\
             \u{20}  {}",
            or_fallback(&payload.title, "Event"),
            event.display_number(),
            millis_to_date(event.occurred_at),
            or_fallback(&payload.description, "No description"),
        ));
    }
    lines.join("\n")
}

pub fn report(summary: &ActivitySummary) -> String {
    let mut lines = vec![
        "📊 Activity summary".to_string(),
        String::new(),
        format!("Events ({} days): {}", summary.window_days, summary.total_events),
        format!("Completed-order events: {}", summary.completed_events),
    ];
    if !summary.recent.is_empty() {
        lines.push(String::new());
        lines.push("Recent events:".to_string());
        for event in &summary.recent {
            let payload = event_payload(event);
            lines.push(format!(
                "• {} {} #{} {}",
                millis_to_date(event.occurred_at),
                event.event_type,
                event.display_number(),
                payload.client,
            ));
        }
    }
    lines.join("\n")
}

pub fn stats(
    users: u64,
    admins: usize,
    total_events: u64,
    weekly_total: usize,
    weekly: &[(String, usize)],
) -> String {
    let mut lines = vec![
        "📊 System statistics:".to_string(),
        String::new(),
        "👥 Users:".to_string(),
        format!("• Registered: {users}"),
        format!("• Administrators: {admins}"),
        String::new(),
        "📈 Events:".to_string(),
        format!("• Total: {total_events}"),
        format!("• Last 7 days: {weekly_total}"),
    ];
    if !weekly.is_empty() {
        lines.push(String::new());
        lines.push("📅 Weekly activity:".to_string());
        for (event_type, count) in weekly.iter().take(10) {
            lines.push(format!("• {event_type}: {count}"));
        }
    }
    lines.join("\n")
}

pub fn notify_usage() -> String {
    "ℹ️ Usage: /notify <notification text>".to_string()
}

pub fn broadcast_result(report: &BroadcastReport) -> String {
    format!(
        "📨 Notification delivered:\n\
         ✅ Sent: {}\n\
         ❌ Failed: {}",
        report.sent_count, report.failed_count
    )
}

fn event_payload(event: &OrderEvent) -> shared::models::EventPayload {
    shared::models::EventPayload::parse_or_default(&event.payload)
}
