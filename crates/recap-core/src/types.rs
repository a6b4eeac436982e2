// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Recap pipeline.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Platform-assigned chat identifier. Never generated by Recap.
pub type ChatId = i64;

/// Identifier of a message sent through a channel adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Provider,
    Storage,
    Cache,
}

// --- Persistence types ---

/// A chat group known to the store (`telegram_group` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatGroup {
    /// Platform chat identifier (primary key).
    pub id: ChatId,
    /// Display title captured when the group was first seen.
    pub title: Option<String>,
    /// RFC 3339 timestamp of first sight.
    pub join_date: String,
    /// Always true in the current scope.
    pub is_active: bool,
}

/// A chat group together with the number of messages stored for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStats {
    #[serde(flatten)]
    pub group: ChatGroup,
    pub message_count: i64,
}

/// A persisted chat message (`message` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Locally generated sequential id; reflects insertion order.
    pub id: i64,
    /// Platform message id. Not unique across chats.
    pub telegram_message_id: i64,
    /// Owning chat group.
    pub group_id: ChatId,
    pub user_id: i64,
    /// Sender username, or first name when the sender has no username.
    pub username: String,
    pub content: Option<String>,
    /// RFC 3339 arrival timestamp, set at insert time.
    pub timestamp: String,
}

/// Everything the ingestor needs to persist one inbound text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub chat_id: ChatId,
    pub chat_title: Option<String>,
    pub user_id: i64,
    pub username: String,
    pub message_id: i64,
    pub text: Option<String>,
}

// --- Channel types ---

/// The sender of an inbound message, validated at the channel boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub user_id: i64,
    /// Username, falling back to first name.
    pub display_name: String,
}

/// A plain (non-command) text message from a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage {
    pub chat_id: ChatId,
    pub chat_title: Option<String>,
    pub message_id: i64,
    pub sender: Sender,
    pub text: String,
}

impl TextMessage {
    /// Converts the event into the row the ingestor writes.
    pub fn to_new_message(&self) -> NewMessage {
        NewMessage {
            chat_id: self.chat_id,
            chat_title: self.chat_title.clone(),
            user_id: self.sender.user_id,
            username: self.sender.display_name.clone(),
            message_id: self.message_id,
            text: Some(self.text.clone()),
        }
    }
}

/// Commands understood by the bot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
pub enum BotCommand {
    /// Summarize the most recent window of messages.
    #[strum(to_string = "summarize", serialize = "ai_summarise")]
    Summarize,
    /// Summarize messages sent since the start of the current UTC day.
    SummarizeDay,
    /// Summarize messages sent during the last seven days.
    SummarizeWeek,
    /// Show the welcome message.
    Start,
    /// Show the command overview.
    Help,
}

impl BotCommand {
    /// Short description used when registering commands with the platform.
    pub fn description(&self) -> &'static str {
        match self {
            BotCommand::Summarize => "Summarize the last 20 messages",
            BotCommand::SummarizeDay => "Summarize all messages from today",
            BotCommand::SummarizeWeek => "Summarize all messages from the last 7 days",
            BotCommand::Start => "Start the bot and show welcome message",
            BotCommand::Help => "Show available commands and usage",
        }
    }
}

/// A recognized command issued in a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMessage {
    pub chat_id: ChatId,
    pub message_id: i64,
    pub sender: Option<Sender>,
    pub command: BotCommand,
}

/// An inbound event, classified and validated at the channel boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Non-command text; routed to the ingestor.
    TextMessage(TextMessage),
    /// A recognized command; routed to the orchestrator.
    Command(CommandMessage),
    /// Anything else (media, service messages, unknown commands).
    Other,
}

/// How the text of a [`Reply`] should be interpreted by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyFormat {
    #[default]
    Plain,
    Html,
}

/// An outbound reply to a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub chat_id: ChatId,
    pub text: String,
    pub format: ReplyFormat,
}

impl Reply {
    pub fn plain(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            format: ReplyFormat::Plain,
        }
    }

    pub fn html(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            format: ReplyFormat::Html,
        }
    }
}

// --- Provider types ---

/// A single-shot text generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model override; the provider default is used when `None`.
    pub model: Option<String>,
    /// Instruction fixing the assistant's role.
    pub system_prompt: String,
    /// The user prompt.
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A generated completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub id: String,
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
}
