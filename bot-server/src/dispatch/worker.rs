//! Notification delivery worker
//!
//! Polls the task store on a fixed cadence and drains pending tasks in
//! creation order. At-least-once with unbounded retry: a failed send
//! leaves the task `pending` for the next cycle, with no backoff and no
//! dead-letter state. A task that can never succeed (invalid
//! recipient) retries forever; that is a known operational risk,
//! surfaced by the warning logged each cycle rather than capped away.
//!
//! If the process dies after a successful send but before the status
//! update lands, the task is resent next cycle. Recipients must
//! tolerate duplicates.

use std::sync::Arc;
use std::time::Duration;

use shared::util::now_millis;
use tokio_util::sync::CancellationToken;

use crate::gateway::MessagingGateway;
use crate::store::TaskStore;
use crate::utils::AppResult;

/// Outcome of one poll cycle
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    pub fetched: usize,
    pub sent: usize,
    pub failed: usize,
}

pub struct NotificationWorker {
    tasks: Arc<dyn TaskStore>,
    gateway: Arc<dyn MessagingGateway>,
    interval: Duration,
    initial_delay: Duration,
    batch_size: usize,
    shutdown: CancellationToken,
}

impl NotificationWorker {
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        gateway: Arc<dyn MessagingGateway>,
        interval: Duration,
        initial_delay: Duration,
        batch_size: usize,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            tasks,
            gateway,
            interval,
            initial_delay,
            batch_size,
            shutdown,
        }
    }

    /// Main loop: initial delay, then one poll cycle per tick until
    /// shutdown. A failed cycle is logged and skipped - the worker
    /// never takes the process down.
    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            batch_size = self.batch_size,
            "Notification worker started"
        );

        tokio::select! {
            _ = tokio::time::sleep(self.initial_delay) => {}
            _ = self.shutdown.cancelled() => {
                tracing::info!("Notification worker stopped before first cycle");
                return;
            }
        }

        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    match self.poll_cycle().await {
                        Ok(stats) if stats.fetched > 0 => {
                            tracing::info!(
                                fetched = stats.fetched,
                                sent = stats.sent,
                                failed = stats.failed,
                                "Delivery cycle complete"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => {
                            tracing::error!("Delivery cycle skipped: {e}");
                        }
                    }
                }
            }
        }

        tracing::info!("Notification worker stopped");
    }

    /// One poll cycle: fetch up to `batch_size` pending tasks
    /// oldest-first and attempt each exactly once.
    pub async fn poll_cycle(&self) -> AppResult<CycleStats> {
        let batch = self.tasks.fetch_pending(self.batch_size).await?;
        let mut stats = CycleStats {
            fetched: batch.len(),
            ..CycleStats::default()
        };

        for task in batch {
            match self
                .gateway
                .send_message(task.recipient_id, &task.message_text)
                .await
            {
                Ok(()) => {
                    stats.sent += 1;
                    // Delivered; if this update is lost the task stays
                    // pending and is resent next cycle
                    if let Err(e) = self.tasks.mark_sent(task.id, now_millis()).await {
                        tracing::error!(
                            task_id = task.id,
                            "Delivered but failed to mark sent: {e}"
                        );
                    }
                }
                Err(e) => {
                    stats.failed += 1;
                    tracing::warn!(
                        task_id = task.id,
                        recipient = task.recipient_id,
                        "Delivery failed, task stays pending: {e}"
                    );
                }
            }
        }

        Ok(stats)
    }
}
