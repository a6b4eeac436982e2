// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for messaging platform integrations.

use async_trait::async_trait;

use crate::error::RecapError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{BotCommand, InboundEvent, MessageId, Reply};

/// Adapter for bidirectional messaging channel integrations.
///
/// Channel adapters classify inbound updates into [`InboundEvent`]s and
/// deliver [`Reply`]s back to chats.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), RecapError>;

    /// Sends a reply to a chat.
    async fn send(&self, reply: Reply) -> Result<MessageId, RecapError>;

    /// Receives the next inbound event from the channel.
    async fn receive(&self) -> Result<InboundEvent, RecapError>;

    /// Registers the command list with the platform so clients can offer it.
    async fn register_commands(&self, _commands: &[BotCommand]) -> Result<(), RecapError> {
        Ok(())
    }
}
