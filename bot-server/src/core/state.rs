//! Shared service state

use std::sync::Arc;

use crate::core::Config;
use crate::gateway::{MessagingGateway, TelegramGateway};
use crate::store::{EventLog, RecipientRegistry, SupabaseStore, TaskStore};
use crate::utils::{AppError, AppResult};

/// Arc bundle of configuration and the external collaborators.
///
/// Cloning is shallow; every component sees the same instances. There
/// is no mutable in-process state here - all state of record lives in
/// the external stores.
#[derive(Clone)]
pub struct BotState {
    pub config: Arc<Config>,
    pub events: Arc<dyn EventLog>,
    pub tasks: Arc<dyn TaskStore>,
    pub recipients: Arc<dyn RecipientRegistry>,
    pub gateway: Arc<dyn MessagingGateway>,
}

impl BotState {
    /// Wire the production collaborators: Supabase store + Telegram
    /// gateway. Fails only on missing configuration - the one
    /// unrecoverable startup condition.
    pub fn initialize(config: Config) -> AppResult<(Self, Arc<TelegramGateway>)> {
        if config.supabase_url.is_empty() || config.supabase_key.is_empty() {
            return Err(AppError::invalid("SUPABASE_URL / SUPABASE_KEY not set"));
        }
        if config.telegram_token.is_empty() {
            return Err(AppError::invalid("TELEGRAM_TOKEN not set"));
        }

        let store = Arc::new(SupabaseStore::new(
            config.supabase_url.clone(),
            config.supabase_key.clone(),
        )?);
        let telegram = Arc::new(TelegramGateway::new(&config.telegram_token)?);

        let state = Self {
            config: Arc::new(config),
            events: store.clone(),
            tasks: store.clone(),
            recipients: store,
            gateway: telegram.clone(),
        };
        Ok((state, telegram))
    }

    /// Wire arbitrary collaborators; used by tests and demo setups
    pub fn with_stores(
        config: Config,
        events: Arc<dyn EventLog>,
        tasks: Arc<dyn TaskStore>,
        recipients: Arc<dyn RecipientRegistry>,
        gateway: Arc<dyn MessagingGateway>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            events,
            tasks,
            recipients,
            gateway,
        }
    }
}
