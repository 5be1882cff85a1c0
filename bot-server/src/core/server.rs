//! Bot server runtime
//!
//! Single cooperative model: the update long-poll loop and the
//! notification worker are tokio tasks interleaved on one runtime.
//! Every external call is a suspension point; a long interactive query
//! can delay the next scheduled poll and vice versa - accepted, since
//! all operations recompute from fresh fetches and are retryable.

use std::sync::Arc;
use std::time::Duration;

use crate::commands::{CommandHandler, SenderInfo, render};
use crate::core::{BackgroundTasks, BotState, Config};
use crate::dispatch::NotificationWorker;
use crate::gateway::TelegramGateway;
use crate::gateway::telegram::Update;
use crate::utils::AppResult;

/// Pause after a failed update poll before trying again
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct BotServer {
    state: BotState,
    telegram: Arc<TelegramGateway>,
}

impl BotServer {
    /// Wire the production collaborators from configuration
    pub fn initialize(config: Config) -> AppResult<Self> {
        let (state, telegram) = BotState::initialize(config)?;
        Ok(Self { state, telegram })
    }

    /// Run until Ctrl-C: spawns the notification worker, then drives
    /// the update intake loop on this task.
    pub async fn run(self) -> AppResult<()> {
        let mut tasks = BackgroundTasks::new();
        let shutdown = tasks.shutdown_token();

        let config = &self.state.config;
        let worker = NotificationWorker::new(
            self.state.tasks.clone(),
            self.state.gateway.clone(),
            Duration::from_secs(config.dispatch_interval_secs),
            Duration::from_secs(config.dispatch_initial_delay_secs),
            config.dispatch_batch_size,
            shutdown.clone(),
        );
        tasks.spawn("notification_worker", worker.run());

        let handler = CommandHandler::new(&self.state);
        tracing::info!("Bot server started, polling for updates");

        let mut offset: i64 = 0;
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
                result = self
                    .telegram
                    .get_updates(offset, self.state.config.update_poll_timeout_secs) =>
                {
                    match result {
                        Ok(updates) => {
                            for update in updates {
                                offset = offset.max(update.update_id + 1);
                                self.dispatch_update(&handler, update).await;
                            }
                        }
                        Err(e) => {
                            tracing::error!("Update poll failed: {e}");
                            tokio::time::sleep(POLL_RETRY_DELAY).await;
                        }
                    }
                }
            }
        }

        tasks.shutdown().await;
        Ok(())
    }

    /// Route one update through the command handler and send the reply
    /// back in transport-sized chunks.
    async fn dispatch_update(&self, handler: &CommandHandler, update: Update) {
        let Some(message) = update.message else { return };
        let Some(text) = message.text.as_deref() else {
            return;
        };

        let sender = match &message.from {
            Some(from) => SenderInfo {
                id: from.id,
                username: from.username.clone(),
                first_name: from.first_name.clone(),
                last_name: from.last_name.clone(),
            },
            None => SenderInfo::bare(message.chat.id),
        };

        let Some(reply) = handler.handle(&sender, text).await else {
            return;
        };

        for chunk in render::chunk_message(&reply, self.state.config.message_chunk_chars) {
            if let Err(e) = self.state.gateway.send_message(message.chat.id, &chunk).await {
                tracing::error!(chat = message.chat.id, "Failed to send reply: {e}");
                break;
            }
        }
    }
}
