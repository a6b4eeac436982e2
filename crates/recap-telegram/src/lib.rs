// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Recap chat summarizer.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide:
//! long polling, command parsing, membership handling, and HTML replies
//! with a plain-text fallback.

pub mod commands;
pub mod handler;
pub mod html;

use std::sync::Arc;

use async_trait::async_trait;
use recap_config::model::TelegramConfig;
use recap_core::{
    AdapterType, BotCommand, ChannelAdapter, HealthStatus, InboundEvent, MessageId, PluginAdapter,
    RecapError, Reply, ReplyFormat,
};
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode, UserId};
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

fn channel_err(action: &str, e: teloxide::RequestError) -> RecapError {
    RecapError::Channel {
        message: format!("{action}: {e}"),
        source: Some(Box::new(e)),
    }
}

struct BotIdentity {
    id: UserId,
    username: String,
}

/// Telegram channel adapter implementing [`ChannelAdapter`].
pub struct TelegramChannel {
    bot: Bot,
    inbound_rx: Mutex<mpsc::Receiver<InboundEvent>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
    polling: CancellationToken,
    connected: bool,
}

impl TelegramChannel {
    /// Creates a new Telegram channel adapter.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: &TelegramConfig) -> Result<Self, RecapError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            RecapError::Config("telegram.bot_token is required (or set TELEGRAM_BOT_TOKEN)".into())
        })?;

        if token.is_empty() {
            return Err(RecapError::Config("telegram.bot_token cannot be empty".into()));
        }

        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot: Bot::new(token),
            inbound_rx: Mutex::new(inbound_rx),
            inbound_tx,
            polling: CancellationToken::new(),
            connected: false,
        })
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    async fn send_html(&self, chat_id: ChatId, text: &str) -> Result<Message, RecapError> {
        match self
            .bot
            .send_message(chat_id, text)
            .parse_mode(ParseMode::Html)
            .await
        {
            Ok(sent) => Ok(sent),
            Err(e) => {
                warn!(chat_id = chat_id.0, error = %e, "HTML send failed, sending as plain text");
                self.bot
                    .send_message(chat_id, html::to_plain_text(text))
                    .await
                    .map_err(|e| channel_err("failed to send message", e))
            }
        }
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, RecapError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), RecapError> {
        debug!("Telegram channel shutting down");
        self.polling.cancel();
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), RecapError> {
        if self.connected {
            return Ok(());
        }

        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| channel_err("failed to fetch bot identity", e))?;

        if !me.can_read_all_group_messages {
            warn!(
                username = me.username(),
                "group privacy mode is enabled; only commands will reach the bot. \
                 Disable it via @BotFather /setprivacy to log group messages"
            );
        }

        let identity = Arc::new(BotIdentity {
            id: me.user.id,
            username: me.username().to_string(),
        });
        info!(username = identity.username.as_str(), "starting Telegram long polling");

        let tx = self.inbound_tx.clone();
        let handler = Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
            let tx = tx.clone();
            let identity = identity.clone();
            async move {
                if let Some(members) = msg.new_chat_members() {
                    if handler::bot_was_added(members, identity.id) {
                        info!(chat_id = msg.chat.id.0, "added to chat");
                        handler::request_admin_if_needed(&bot, msg.chat.id, identity.id).await;
                    }
                    return respond(());
                }

                let event = handler::classify(&msg, &identity.username);
                if event == InboundEvent::Other {
                    debug!(msg_id = msg.id.0, "ignoring unsupported message");
                    return respond(());
                }

                if tx.send(event).await.is_err() {
                    warn!("inbound channel closed, dropping update");
                }
                respond(())
            }
        });

        let bot = self.bot.clone();
        let cancel = self.polling.clone();
        tokio::spawn(async move {
            let mut dispatcher = Dispatcher::builder(bot, handler)
                .default_handler(|_| async {})
                .build();

            tokio::select! {
                _ = dispatcher.dispatch() => {
                    error!("Telegram dispatcher exited");
                }
                _ = cancel.cancelled() => {
                    info!("Telegram polling stopped");
                }
            }
        });

        self.connected = true;
        Ok(())
    }

    async fn send(&self, reply: Reply) -> Result<MessageId, RecapError> {
        let chat_id = ChatId(reply.chat_id);
        let sent = match reply.format {
            ReplyFormat::Html => self.send_html(chat_id, &reply.text).await?,
            ReplyFormat::Plain => self
                .bot
                .send_message(chat_id, reply.text)
                .await
                .map_err(|e| channel_err("failed to send message", e))?,
        };

        Ok(MessageId(sent.id.0.to_string()))
    }

    async fn receive(&self) -> Result<InboundEvent, RecapError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| RecapError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }

    async fn register_commands(&self, commands: &[BotCommand]) -> Result<(), RecapError> {
        self.bot
            .set_my_commands(commands::to_menu(commands))
            .await
            .map_err(|e| channel_err("failed to register commands", e))?;
        info!(count = commands.len(), "registered bot commands");
        Ok(())
    }
}
