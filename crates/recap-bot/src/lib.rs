// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event loop for the Recap chat summarizer.
//!
//! [`BotLoop`] receives [`InboundEvent`]s from a channel and handles each in
//! its own task: text messages are stored, commands are answered.

pub mod ingest;
pub mod replies;
pub mod shutdown;
pub mod summarize;

use std::sync::Arc;
use std::time::Duration;

use recap_core::{
    BotCommand, ChannelAdapter, CommandMessage, InboundEvent, PluginAdapter, RecapError, Reply,
    StorageAdapter,
};
use strum::IntoEnumIterator;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info, trace, warn};

pub use summarize::{FlowSettings, SummarizeFlow, SummaryScope};

/// Shared handles needed to handle one event.
#[derive(Clone)]
pub struct BotContext {
    pub channel: Arc<dyn ChannelAdapter>,
    pub storage: Arc<dyn StorageAdapter>,
    pub flow: Arc<SummarizeFlow>,
}

impl BotContext {
    /// Handles a single inbound event to completion.
    pub async fn handle_event(&self, event: InboundEvent) {
        match event {
            InboundEvent::TextMessage(msg) => {
                ingest::ingest_message(self.storage.as_ref(), &msg).await;
            }
            InboundEvent::Command(cmd) => {
                let chat_id = cmd.chat_id;
                let reply = self.answer(&cmd).await;
                if let Err(e) = self.channel.send(reply).await {
                    error!(chat_id, error = %e, "failed to send reply");
                }
            }
            InboundEvent::Other => trace!("ignoring event"),
        }
    }

    async fn answer(&self, cmd: &CommandMessage) -> Reply {
        info!(
            chat_id = cmd.chat_id,
            command = %cmd.command,
            user_id = cmd.sender.as_ref().map(|s| s.user_id),
            "command received"
        );
        match cmd.command {
            BotCommand::Start => Reply::plain(cmd.chat_id, replies::WELCOME),
            BotCommand::Help => Reply::plain(cmd.chat_id, replies::HELP),
            BotCommand::Summarize => self.flow.run(cmd.chat_id, SummaryScope::Recent).await,
            BotCommand::SummarizeDay => self.flow.run(cmd.chat_id, SummaryScope::Today).await,
            BotCommand::SummarizeWeek => self.flow.run(cmd.chat_id, SummaryScope::Week).await,
        }
    }
}

/// The receive loop.
///
/// Each event is handled in a tracked task so a slow summary never blocks
/// ingestion. On shutdown in-flight tasks are given `drain_timeout` to
/// finish before storage is closed.
pub struct BotLoop {
    ctx: BotContext,
    tracker: TaskTracker,
    drain_timeout: Duration,
}

impl BotLoop {
    pub fn new(ctx: BotContext) -> Self {
        Self {
            ctx,
            tracker: TaskTracker::new(),
            drain_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    pub fn context(&self) -> &BotContext {
        &self.ctx
    }

    /// Runs until `cancel` fires or the channel closes.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), RecapError> {
        let commands: Vec<BotCommand> = BotCommand::iter().collect();
        if let Err(e) = self.ctx.channel.register_commands(&commands).await {
            warn!(error = %e, "failed to register commands");
        }

        info!(channel = self.ctx.channel.name(), "bot loop running");

        loop {
            tokio::select! {
                event = self.ctx.channel.receive() => {
                    match event {
                        Ok(event) => {
                            let ctx = self.ctx.clone();
                            self.tracker.spawn(async move { ctx.handle_event(event).await });
                        }
                        Err(e) => {
                            error!(error = %e, "channel receive error, stopping bot loop");
                            break;
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping bot loop");
                    break;
                }
            }
        }

        self.tracker.close();
        if tokio::time::timeout(self.drain_timeout, self.tracker.wait())
            .await
            .is_err()
        {
            warn!(remaining = self.tracker.len(), "timeout reached, abandoning in-flight events");
        }

        if let Err(e) = self.ctx.channel.shutdown().await {
            warn!(error = %e, "channel shutdown failed");
        }
        self.ctx.storage.close().await?;

        info!("bot loop stopped");
        Ok(())
    }
}
