// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message operations: insert, windowed fetches, and retention.

use chrono::{DateTime, Utc};
use recap_core::{ChatId, NewMessage, RecapError, StoredMessage};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::queries::format_timestamp;
use crate::queries::groups::ensure_group;

const SELECT_COLUMNS: &str =
    "SELECT id, telegram_message_id, group_id, user_id, username, content, timestamp FROM message";

fn row_to_message(row: &rusqlite::Row<'_>) -> Result<StoredMessage, rusqlite::Error> {
    Ok(StoredMessage {
        id: row.get(0)?,
        telegram_message_id: row.get(1)?,
        group_id: row.get(2)?,
        user_id: row.get(3)?,
        username: row.get(4)?,
        content: row.get(5)?,
        timestamp: row.get(6)?,
    })
}

/// Stores a message stamped with `at`, creating its group on first sight.
///
/// The group upsert and the message insert share one transaction.
pub async fn insert_message(
    db: &Database,
    msg: &NewMessage,
    at: DateTime<Utc>,
) -> Result<StoredMessage, RecapError> {
    let msg = msg.clone();
    let timestamp = format_timestamp(at);
    db.connection()
        .call(move |conn| -> Result<StoredMessage, rusqlite::Error> {
            let tx = conn.transaction()?;
            let created = ensure_group(&tx, msg.chat_id, msg.chat_title.as_deref(), &timestamp)?;
            if created {
                tracing::info!(chat_id = msg.chat_id, "registered new chat group");
            }
            tx.execute(
                "INSERT INTO message (telegram_message_id, group_id, user_id, username, content, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    msg.message_id,
                    msg.chat_id,
                    msg.user_id,
                    msg.username,
                    msg.text,
                    timestamp,
                ],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(StoredMessage {
                id,
                telegram_message_id: msg.message_id,
                group_id: msg.chat_id,
                user_id: msg.user_id,
                username: msg.username,
                content: msg.text,
                timestamp,
            })
        })
        .await
        .map_err(map_tr_err)
}

/// The `limit` most recent messages of a chat, newest first. Equal
/// timestamps are ordered by insertion, newest insertion first.
pub async fn fetch_recent(
    db: &Database,
    chat_id: ChatId,
    limit: usize,
) -> Result<Vec<StoredMessage>, RecapError> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.reader()
        .call(move |conn| -> Result<Vec<StoredMessage>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE group_id = ?1
                 ORDER BY timestamp DESC, id DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![chat_id, limit], row_to_message)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Like [`fetch_recent`], restricted to messages stored at or after `since`.
pub async fn fetch_since(
    db: &Database,
    chat_id: ChatId,
    since: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<StoredMessage>, RecapError> {
    let since = format_timestamp(since);
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.reader()
        .call(move |conn| -> Result<Vec<StoredMessage>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE group_id = ?1 AND timestamp >= ?2
                 ORDER BY timestamp DESC, id DESC LIMIT ?3"
            ))?;
            let rows = stmt.query_map(params![chat_id, since, limit], row_to_message)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Deletes the chat's messages stored strictly before `cutoff`.
pub async fn delete_before(
    db: &Database,
    chat_id: ChatId,
    cutoff: DateTime<Utc>,
) -> Result<u64, RecapError> {
    let cutoff = format_timestamp(cutoff);
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "DELETE FROM message WHERE group_id = ?1 AND timestamp < ?2",
                params![chat_id, cutoff],
            )
        })
        .await
        .map(|n| n as u64)
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::groups::{get_group, list_groups};
    use chrono::{Duration, TimeZone};

    fn new_message(chat_id: ChatId, message_id: i64, text: &str) -> NewMessage {
        NewMessage {
            chat_id,
            chat_title: Some(format!("chat {chat_id}")),
            user_id: 7,
            username: "alice".to_string(),
            message_id,
            text: Some(text.to_string()),
        }
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn insert_creates_group_once() {
        let db = Database::open(":memory:").await.unwrap();
        let t = base_time();
        insert_message(&db, &new_message(-1, 1, "a"), t).await.unwrap();
        insert_message(&db, &new_message(-1, 2, "b"), t + Duration::seconds(1))
            .await
            .unwrap();

        let groups = list_groups(&db).await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].message_count, 2);
        let group = get_group(&db, -1).await.unwrap().unwrap();
        assert_eq!(group.join_date, format_timestamp(t));
    }

    #[tokio::test]
    async fn stored_row_is_returned() {
        let db = Database::open(":memory:").await.unwrap();
        let stored = insert_message(&db, &new_message(5, 99, "hello"), base_time())
            .await
            .unwrap();
        assert!(stored.id > 0);
        assert_eq!(stored.telegram_message_id, 99);
        assert_eq!(stored.content.as_deref(), Some("hello"));
        assert_eq!(stored.timestamp, "2026-05-01T12:00:00.000Z");
    }

    #[tokio::test]
    async fn fetch_recent_is_newest_first_and_limited() {
        let db = Database::open(":memory:").await.unwrap();
        let t = base_time();
        for i in 0..25 {
            insert_message(&db, &new_message(1, i, &format!("m{i}")), t + Duration::seconds(i))
                .await
                .unwrap();
        }

        let window = fetch_recent(&db, 1, 20).await.unwrap();
        assert_eq!(window.len(), 20);
        assert_eq!(window[0].content.as_deref(), Some("m24"));
        assert_eq!(window[19].content.as_deref(), Some("m5"));
    }

    #[tokio::test]
    async fn equal_timestamps_break_ties_by_insertion() {
        let db = Database::open(":memory:").await.unwrap();
        let t = base_time();
        for text in ["first", "second", "third"] {
            insert_message(&db, &new_message(1, 0, text), t).await.unwrap();
        }
        let window = fetch_recent(&db, 1, 20).await.unwrap();
        let texts: Vec<_> = window.iter().filter_map(|m| m.content.as_deref()).collect();
        assert_eq!(texts, ["third", "second", "first"]);
    }

    #[tokio::test]
    async fn fetch_is_scoped_to_chat() {
        let db = Database::open(":memory:").await.unwrap();
        insert_message(&db, &new_message(1, 1, "one"), base_time())
            .await
            .unwrap();
        insert_message(&db, &new_message(2, 1, "two"), base_time())
            .await
            .unwrap();

        let window = fetch_recent(&db, 2, 20).await.unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].content.as_deref(), Some("two"));
        assert!(fetch_recent(&db, 3, 20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_since_applies_lower_bound() {
        let db = Database::open(":memory:").await.unwrap();
        let t = base_time();
        insert_message(&db, &new_message(1, 1, "old"), t - Duration::days(2))
            .await
            .unwrap();
        insert_message(&db, &new_message(1, 2, "edge"), t).await.unwrap();
        insert_message(&db, &new_message(1, 3, "new"), t + Duration::hours(1))
            .await
            .unwrap();

        let window = fetch_since(&db, 1, t, 100).await.unwrap();
        let texts: Vec<_> = window.iter().filter_map(|m| m.content.as_deref()).collect();
        assert_eq!(texts, ["new", "edge"]);
    }

    #[tokio::test]
    async fn delete_before_only_touches_old_rows_of_one_chat() {
        let db = Database::open(":memory:").await.unwrap();
        let now = base_time();
        insert_message(&db, &new_message(1, 1, "old-a"), now - Duration::days(10))
            .await
            .unwrap();
        insert_message(&db, &new_message(1, 2, "new-a"), now - Duration::days(1))
            .await
            .unwrap();
        insert_message(&db, &new_message(2, 1, "old-b"), now - Duration::days(10))
            .await
            .unwrap();

        let deleted = delete_before(&db, 1, now - Duration::days(7)).await.unwrap();
        assert_eq!(deleted, 1);

        let a = fetch_recent(&db, 1, 20).await.unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].content.as_deref(), Some("new-a"));
        assert_eq!(fetch_recent(&db, 2, 20).await.unwrap().len(), 1);
    }
}
