//! Command routing
//!
//! Maps each parsed command to exactly one query or dispatch operation.
//! Store failures are caught here, at the operation boundary: logged,
//! and replaced by a generic failure reply - never propagated into the
//! server loop.

use std::sync::Arc;

use shared::models::Recipient;

use super::{Command, render};
use crate::core::{BotState, Config};
use crate::dispatch::Broadcaster;
use crate::orders::OrderQueryEngine;
use crate::store::RecipientRegistry;
use crate::utils::AppError;

/// Identity attached to an incoming command
#[derive(Debug, Clone)]
pub struct SenderInfo {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl SenderInfo {
    pub fn bare(id: i64) -> Self {
        Self {
            id,
            username: None,
            first_name: None,
            last_name: None,
        }
    }
}

pub struct CommandHandler {
    config: Arc<Config>,
    queries: OrderQueryEngine,
    broadcaster: Broadcaster,
    recipients: Arc<dyn RecipientRegistry>,
}

impl CommandHandler {
    pub fn new(state: &BotState) -> Self {
        let config = state.config.clone();
        Self {
            queries: OrderQueryEngine::new(
                state.events.clone(),
                config.lookback_days,
                config.upcoming_days,
            ),
            broadcaster: Broadcaster::new(
                state.recipients.clone(),
                state.gateway.clone(),
                config.admin_ids.clone(),
            ),
            recipients: state.recipients.clone(),
            config,
        }
    }

    /// Route one incoming message. Returns `None` for non-command text
    /// (ignored), otherwise the reply to send back.
    pub async fn handle(&self, sender: &SenderInfo, text: &str) -> Option<String> {
        let command = Command::parse(text)?;
        tracing::debug!(sender = sender.id, ?command, "Handling command");

        let reply = match command {
            Command::Start => self.start(sender).await,
            Command::Help => render::help(),
            Command::Orders => match self.queries.active_orders().await {
                Ok(orders) => render::active_orders(&orders),
                Err(e) => failure("active orders", &e),
            },
            Command::Completed => match self.queries.completed_orders().await {
                Ok(orders) => render::completed_orders(&orders),
                Err(e) => failure("completed orders", &e),
            },
            Command::Status(needle) if needle.is_empty() => render::status_usage(),
            Command::Status(needle) => match self.queries.filter_by_status(&needle).await {
                Ok(page) => render::status_results(&needle, &page),
                Err(e) => failure("status filter", &e),
            },
            Command::MissingPhotos => match self.queries.missing_photos().await {
                Ok(events) => render::missing_photos(&events),
                Err(e) => failure("missing photos", &e),
            },
            Command::Upcoming => match self.queries.upcoming_deadlines().await {
                Ok(events) => render::upcoming(&events),
                Err(e) => failure("upcoming deadlines", &e),
            },
            Command::Report => match self.queries.activity_summary().await {
                Ok(summary) => render::report(&summary),
                Err(e) => failure("activity summary", &e),
            },
            Command::Stats => self.stats(sender).await,
            Command::Notify(text) if text.is_empty() => {
                if self.config.is_admin(sender.id) {
                    render::notify_usage()
                } else {
                    render::ADMIN_ONLY.to_string()
                }
            }
            Command::Notify(text) => self.notify(sender, &text).await,
            Command::Unknown(_) => render::unknown_command(),
        };
        Some(reply)
    }

    /// Register the sender on first contact, then greet. Registration
    /// failure is logged but never blocks the welcome.
    async fn start(&self, sender: &SenderInfo) -> String {
        let recipient = Recipient {
            recipient_id: sender.id,
            username: sender.username.clone(),
            first_name: sender.first_name.clone(),
            last_name: sender.last_name.clone(),
            is_admin: self.config.is_admin(sender.id),
        };
        match self.recipients.upsert_if_absent(&recipient).await {
            Ok(true) => {
                tracing::info!(
                    recipient = sender.id,
                    username = sender.username.as_deref().unwrap_or(""),
                    "Registered new recipient"
                );
            }
            Ok(false) => {}
            Err(e) => tracing::error!(recipient = sender.id, "Registration failed: {e}"),
        }
        render::welcome(sender.first_name.as_deref())
    }

    /// Admin-gated system statistics
    async fn stats(&self, sender: &SenderInfo) -> String {
        if !self.config.is_admin(sender.id) {
            return render::ADMIN_ONLY.to_string();
        }

        let gathered = async {
            let users = self.recipients.count().await?;
            let total_events = self.queries.total_events().await?;
            let weekly = self.queries.weekly_activity().await?;
            Ok::<_, AppError>((users, total_events, weekly))
        };
        match gathered.await {
            Ok((users, total_events, weekly)) => {
                let weekly_total = weekly.iter().map(|(_, count)| count).sum();
                render::stats(
                    users,
                    self.config.admin_ids.len(),
                    total_events,
                    weekly_total,
                    &weekly,
                )
            }
            Err(e) => failure("statistics", &e),
        }
    }

    /// Admin-gated broadcast; the tally comes back to the requester
    async fn notify(&self, sender: &SenderInfo, text: &str) -> String {
        let message = format!("🔔 Notification from administrator:\n\n{text}");
        match self.broadcaster.broadcast(sender.id, &message).await {
            Ok(report) => render::broadcast_result(&report),
            Err(AppError::Unauthorized) => render::ADMIN_ONLY.to_string(),
            Err(e) => failure("broadcast", &e),
        }
    }
}

fn failure(operation: &str, error: &AppError) -> String {
    tracing::error!("{operation} failed: {error}");
    render::GENERIC_FAILURE.to_string()
}
