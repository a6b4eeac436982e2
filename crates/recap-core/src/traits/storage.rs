// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the message store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::RecapError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatGroup, ChatId, GroupStats, NewMessage, StoredMessage};

/// Adapter for the durable message store.
///
/// Groups are created implicitly on first message. Fetch operations return
/// messages newest first, ties broken by insertion order.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connections).
    async fn initialize(&self) -> Result<(), RecapError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), RecapError>;

    /// Persists one message, creating its group first when unknown.
    async fn store_message(&self, msg: &NewMessage) -> Result<StoredMessage, RecapError>;

    /// Returns up to `limit` most recent messages of a group.
    async fn fetch_recent(
        &self,
        chat_id: ChatId,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, RecapError>;

    /// Returns up to `limit` most recent messages stored at or after `since`.
    async fn fetch_since(
        &self,
        chat_id: ChatId,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, RecapError>;

    /// Deletes messages of a group older than `days` days. Returns the number
    /// of deleted rows.
    async fn cleanup_old_messages(&self, chat_id: ChatId, days: u32) -> Result<u64, RecapError>;

    /// Looks up a single group.
    async fn get_group(&self, chat_id: ChatId) -> Result<Option<ChatGroup>, RecapError>;

    /// Lists all known groups with their stored message counts.
    async fn list_groups(&self) -> Result<Vec<GroupStats>, RecapError>;
}
