// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use recap_config::model::StorageConfig;
use recap_core::{
    AdapterType, ChatGroup, ChatId, GroupStats, HealthStatus, NewMessage, PluginAdapter,
    RecapError, StorageAdapter, StoredMessage,
};

use crate::database::{Database, DatabaseOptions, map_tr_err};
use crate::queries;

/// SQLite-backed message store.
///
/// The database is opened lazily by [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Filesystem path of the database, with any `sqlite://` scheme removed.
    pub fn database_path(&self) -> &str {
        let url = self.config.database_url.as_str();
        url.strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url)
    }

    fn db(&self) -> Result<&Database, RecapError> {
        self.db.get().ok_or_else(|| RecapError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    /// Stores a message with an explicit arrival time.
    pub async fn store_message_at(
        &self,
        msg: &NewMessage,
        at: DateTime<Utc>,
    ) -> Result<StoredMessage, RecapError> {
        queries::messages::insert_message(self.db()?, msg, at).await
    }

    /// Deletes a chat's messages older than `days` days relative to `now`.
    ///
    /// A threshold reaching past the earliest representable time matches no
    /// message, so nothing is deleted.
    pub async fn cleanup_old_messages_at(
        &self,
        chat_id: ChatId,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<u64, RecapError> {
        let db = self.db()?;
        let Some(cutoff) = chrono::TimeDelta::try_days(i64::from(days))
            .and_then(|age| now.checked_sub_signed(age))
        else {
            debug!(chat_id, days, "retention threshold predates all timestamps");
            return Ok(0);
        };
        let deleted = queries::messages::delete_before(db, chat_id, cutoff).await?;
        info!(chat_id, days, deleted, "retention cleanup finished");
        Ok(deleted)
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, RecapError> {
        let db = match self.db() {
            Ok(db) => db,
            Err(_) => return Ok(HealthStatus::Unhealthy("storage not initialized".into())),
        };
        let ping = db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err);
        Ok(match ping {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), RecapError> {
        if self.db.get().is_some() {
            self.close().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), RecapError> {
        let path = self.database_path().to_string();
        let db = Database::open_with(&path, &DatabaseOptions::from(&self.config)).await?;
        self.db.set(db).map_err(|_| RecapError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), RecapError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn store_message(&self, msg: &NewMessage) -> Result<StoredMessage, RecapError> {
        self.store_message_at(msg, Utc::now()).await
    }

    async fn fetch_recent(
        &self,
        chat_id: ChatId,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, RecapError> {
        queries::messages::fetch_recent(self.db()?, chat_id, limit).await
    }

    async fn fetch_since(
        &self,
        chat_id: ChatId,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, RecapError> {
        queries::messages::fetch_since(self.db()?, chat_id, since, limit).await
    }

    async fn cleanup_old_messages(&self, chat_id: ChatId, days: u32) -> Result<u64, RecapError> {
        self.cleanup_old_messages_at(chat_id, days, Utc::now()).await
    }

    async fn get_group(&self, chat_id: ChatId) -> Result<Option<ChatGroup>, RecapError> {
        queries::groups::get_group(self.db()?, chat_id).await
    }

    async fn list_groups(&self) -> Result<Vec<GroupStats>, RecapError> {
        queries::groups::list_groups(self.db()?).await
    }
}
