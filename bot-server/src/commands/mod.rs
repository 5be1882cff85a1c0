//! Bot command surface
//!
//! Thin glue between incoming messages and the core: each command maps
//! to exactly one query or dispatch operation. Parsing is bare slash
//! tokens - no natural language.

pub mod handler;
pub mod render;

pub use handler::{CommandHandler, SenderInfo};

/// Parsed bot command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Orders,
    Completed,
    /// Raw argument text; empty means "show usage"
    Status(String),
    MissingPhotos,
    Upcoming,
    Report,
    Stats,
    /// Raw argument text; empty means "show usage"
    Notify(String),
    Unknown(String),
}

impl Command {
    /// Parse a message text. Returns `None` for non-command chatter,
    /// which the bot ignores.
    pub fn parse(text: &str) -> Option<Command> {
        let rest = text.trim().strip_prefix('/')?;
        let (name, args) = rest
            .split_once(char::is_whitespace)
            .unwrap_or((rest, ""));
        // Group chats address commands as "/orders@SomeBot"
        let name = name.split('@').next().unwrap_or(name);
        let args = trim_quotes(args.trim()).to_string();

        Some(match name {
            "start" => Command::Start,
            "help" => Command::Help,
            "orders" => Command::Orders,
            "completed" => Command::Completed,
            "status" => Command::Status(args),
            "missing_photos" => Command::MissingPhotos,
            "upcoming" => Command::Upcoming,
            "report" => Command::Report,
            "stats" => Command::Stats,
            "notify" => Command::Notify(args),
            other => Command::Unknown(other.to_string()),
        })
    }
}

/// Strip one pair of surrounding double quotes, so
/// `/status "In Transit CHN-IR"` searches the bare phrase
fn trim_quotes(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_commands() {
        assert_eq!(Command::parse("/orders"), Some(Command::Orders));
        assert_eq!(Command::parse("  /help  "), Some(Command::Help));
        assert_eq!(Command::parse("/missing_photos"), Some(Command::MissingPhotos));
    }

    #[test]
    fn parses_arguments() {
        assert_eq!(
            Command::parse("/status In Transit CHN-IR"),
            Some(Command::Status("In Transit CHN-IR".to_string()))
        );
        assert_eq!(
            Command::parse("/status \"In Transit CHN-IR\""),
            Some(Command::Status("In Transit CHN-IR".to_string()))
        );
        assert_eq!(
            Command::parse("/notify maintenance tonight"),
            Some(Command::Notify("maintenance tonight".to_string()))
        );
        assert_eq!(Command::parse("/status"), Some(Command::Status(String::new())));
    }

    #[test]
    fn strips_bot_mention() {
        assert_eq!(Command::parse("/orders@LogisticsBot"), Some(Command::Orders));
    }

    #[test]
    fn non_commands_are_ignored() {
        assert_eq!(Command::parse("hello there"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn unknown_command_is_reported() {
        assert_eq!(
            Command::parse("/frobnicate now"),
            Some(Command::Unknown("frobnicate".to_string()))
        );
    }
}
