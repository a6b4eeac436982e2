// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `recap serve` wiring: builds every adapter from configuration, then runs
//! the bot loop and the health gateway until a shutdown signal arrives.

use std::path::Path;
use std::sync::Arc;

use recap_bot::{BotContext, BotLoop, FlowSettings, SummarizeFlow};
use recap_config::model::{RecapConfig, StorageConfig};
use recap_core::{ChannelAdapter, ProviderAdapter, RecapError, StorageAdapter};
use recap_gateway::GatewayState;
use recap_openai::OpenAiProvider;
use recap_storage::SqliteStorage;
use recap_summarizer::{ResilientProvider, RetryPolicy, Summarizer, SummarizerSettings};
use recap_telegram::TelegramChannel;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Which long-running components a serve command starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeMode {
    /// Bot plus gateway when `gateway.enabled` is set.
    All,
    BotOnly,
    /// Gateway regardless of `gateway.enabled`.
    WebOnly,
}

impl ServeMode {
    fn runs_bot(self) -> bool {
        matches!(self, ServeMode::All | ServeMode::BotOnly)
    }

    fn runs_gateway(self, gateway_enabled: bool) -> bool {
        match self {
            ServeMode::All => gateway_enabled,
            ServeMode::BotOnly => false,
            ServeMode::WebOnly => true,
        }
    }
}

/// Opens and migrates the message store, creating its directory if needed.
pub async fn open_storage(config: &StorageConfig) -> Result<Arc<SqliteStorage>, RecapError> {
    let storage = SqliteStorage::new(config.clone());
    let path = storage.database_path();
    if path != ":memory:"
        && let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| RecapError::Storage {
            source: Box::new(e),
        })?;
    }
    storage.initialize().await?;
    info!(path = storage.database_path(), "message store ready");
    Ok(Arc::new(storage))
}

/// Builds the summarize pipeline and the connected Telegram channel.
async fn build_bot(
    config: &RecapConfig,
    storage: Arc<SqliteStorage>,
    cancel: CancellationToken,
) -> Result<BotLoop, RecapError> {
    let openai = Arc::new(OpenAiProvider::new(&config.openai)?);
    let provider: Arc<dyn ProviderAdapter> = Arc::new(ResilientProvider::new(
        openai,
        RetryPolicy::from(&config.openai),
    ));
    let summarizer = Summarizer::new(provider, SummarizerSettings::from(&config.openai));

    let cache = recap_cache::build_cache(&config.cache, cancel)?;
    let storage: Arc<dyn StorageAdapter> = storage;
    let flow = Arc::new(SummarizeFlow::new(
        storage.clone(),
        cache,
        summarizer,
        FlowSettings::from_config(&config.bot, &config.cache),
    ));

    let mut channel = TelegramChannel::new(&config.telegram)?;
    channel.connect().await?;
    let channel: Arc<dyn ChannelAdapter> = Arc::new(channel);

    Ok(BotLoop::new(BotContext {
        channel,
        storage,
        flow,
    }))
}

/// Starts the gateway task. A gateway failure cancels the whole process.
fn spawn_gateway(
    config: &RecapConfig,
    storage: Arc<SqliteStorage>,
    cancel: CancellationToken,
) -> JoinHandle<Result<(), RecapError>> {
    let gateway_config = config.gateway.clone();
    let state = GatewayState::new(storage, &gateway_config);
    tokio::spawn(async move {
        let result = recap_gateway::serve(&gateway_config, state, cancel.clone()).await;
        if let Err(ref e) = result {
            error!(error = %e, "gateway failed, shutting down");
            cancel.cancel();
        }
        result
    })
}

/// Runs the components selected by `mode` until shutdown.
pub async fn run_serve(config: RecapConfig, mode: ServeMode) -> Result<(), RecapError> {
    info!(name = config.bot.name.as_str(), ?mode, "starting recap");

    let cancel = recap_bot::shutdown::install_signal_handler();
    let storage = open_storage(&config.storage).await?;

    let gateway = mode
        .runs_gateway(config.gateway.enabled)
        .then(|| spawn_gateway(&config, storage.clone(), cancel.clone()));

    let outcome = if mode.runs_bot() {
        match build_bot(&config, storage.clone(), cancel.clone()).await {
            // The bot loop closes the store on exit.
            Ok(bot) => bot.run(cancel.clone()).await,
            Err(e) => {
                error!(error = %e, "failed to start bot");
                Err(e)
            }
        }
    } else {
        cancel.cancelled().await;
        Ok(())
    };

    // Stops the gateway when the bot ended on its own.
    cancel.cancel();

    let gateway_outcome = match gateway {
        Some(handle) => handle
            .await
            .map_err(|e| RecapError::Internal(format!("gateway task panicked: {e}")))
            .and_then(|result| result),
        None => Ok(()),
    };

    if !mode.runs_bot() || outcome.is_err() {
        storage.close().await?;
    }

    info!("recap stopped");
    outcome.and(gateway_outcome)
}
