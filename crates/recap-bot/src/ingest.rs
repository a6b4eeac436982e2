// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence of inbound text messages.

use recap_core::{StorageAdapter, StoredMessage, TextMessage};
use tracing::{debug, error};

/// Stores one text message, creating its group on first sight.
///
/// Errors are logged and swallowed so a storage failure never stops the
/// event loop. Returns the stored row on success.
pub async fn ingest_message(storage: &dyn StorageAdapter, msg: &TextMessage) -> Option<StoredMessage> {
    match storage.store_message(&msg.to_new_message()).await {
        Ok(stored) => {
            debug!(
                chat_id = msg.chat_id,
                id = stored.id,
                username = stored.username.as_str(),
                "stored message"
            );
            Some(stored)
        }
        Err(e) => {
            error!(
                chat_id = msg.chat_id,
                message_id = msg.message_id,
                error = %e,
                "failed to store message"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recap_config::model::StorageConfig;
    use recap_core::Sender;
    use recap_storage::SqliteStorage;
    use tracing_test::traced_test;

    fn text(chat_id: i64, message_id: i64, body: &str) -> TextMessage {
        TextMessage {
            chat_id,
            chat_title: Some("Team".to_string()),
            message_id,
            sender: Sender {
                user_id: 7,
                display_name: "carol".to_string(),
            },
            text: body.to_string(),
        }
    }

    fn storage_at(path: &std::path::Path) -> SqliteStorage {
        SqliteStorage::new(StorageConfig {
            database_url: path.to_string_lossy().to_string(),
            ..StorageConfig::default()
        })
    }

    #[tokio::test]
    async fn stores_message_and_group() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_at(&dir.path().join("ingest.db"));
        storage.initialize().await.unwrap();

        let stored = ingest_message(&storage, &text(-5, 1, "hello")).await.unwrap();
        assert_eq!(stored.group_id, -5);
        assert_eq!(stored.username, "carol");
        assert_eq!(stored.content.as_deref(), Some("hello"));

        let group = storage.get_group(-5).await.unwrap().unwrap();
        assert_eq!(group.title.as_deref(), Some("Team"));
    }

    #[tokio::test]
    #[traced_test]
    async fn storage_failure_is_logged_and_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // Never initialized, so every write fails.
        let storage = storage_at(&dir.path().join("unopened.db"));

        assert!(ingest_message(&storage, &text(-5, 1, "lost")).await.is_none());
        assert!(logs_contain("failed to store message"));
    }
}
