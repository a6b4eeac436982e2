// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat group operations.

use recap_core::{ChatGroup, ChatId, GroupStats, RecapError};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

/// Inserts the group if it is unknown. Existing rows, including their
/// title, are left untouched.
///
/// Synchronous so it can share a transaction with the message insert.
pub(crate) fn ensure_group(
    conn: &rusqlite::Connection,
    chat_id: ChatId,
    title: Option<&str>,
    join_date: &str,
) -> Result<bool, rusqlite::Error> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO telegram_group (id, title, join_date, is_active)
         VALUES (?1, ?2, ?3, 1)",
        params![chat_id, title, join_date],
    )?;
    Ok(inserted > 0)
}

fn row_to_group(row: &rusqlite::Row<'_>) -> Result<ChatGroup, rusqlite::Error> {
    Ok(ChatGroup {
        id: row.get(0)?,
        title: row.get(1)?,
        join_date: row.get(2)?,
        is_active: row.get(3)?,
    })
}

pub async fn get_group(db: &Database, chat_id: ChatId) -> Result<Option<ChatGroup>, RecapError> {
    db.reader()
        .call(move |conn| -> Result<Option<ChatGroup>, rusqlite::Error> {
            conn.query_row(
                "SELECT id, title, join_date, is_active FROM telegram_group WHERE id = ?1",
                params![chat_id],
                row_to_group,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// All groups, oldest first, with the number of stored messages each.
pub async fn list_groups(db: &Database) -> Result<Vec<GroupStats>, RecapError> {
    db.reader()
        .call(|conn| -> Result<Vec<GroupStats>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT g.id, g.title, g.join_date, g.is_active, COUNT(m.id)
                 FROM telegram_group g
                 LEFT JOIN message m ON m.group_id = g.id
                 GROUP BY g.id
                 ORDER BY g.join_date ASC, g.id ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(GroupStats {
                    group: row_to_group(row)?,
                    message_count: row.get(4)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_group_is_insert_if_absent() {
        let db = Database::open(":memory:").await.unwrap();
        let (first, second) = db
            .connection()
            .call(|conn| -> Result<(bool, bool), rusqlite::Error> {
                let first = ensure_group(conn, -42, Some("Original"), "2026-01-01T00:00:00.000Z")?;
                let second = ensure_group(conn, -42, Some("Renamed"), "2026-02-01T00:00:00.000Z")?;
                Ok((first, second))
            })
            .await
            .unwrap();
        assert!(first);
        assert!(!second);

        let group = get_group(&db, -42).await.unwrap().unwrap();
        assert_eq!(group.title.as_deref(), Some("Original"));
        assert_eq!(group.join_date, "2026-01-01T00:00:00.000Z");
        assert!(group.is_active);
    }

    #[tokio::test]
    async fn unknown_group_is_none() {
        let db = Database::open(":memory:").await.unwrap();
        assert!(get_group(&db, 12345).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_groups_counts_messages_including_empty_groups() {
        let db = Database::open(":memory:").await.unwrap();
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                ensure_group(conn, 1, Some("a"), "2026-01-01T00:00:00.000Z")?;
                ensure_group(conn, 2, None, "2026-01-02T00:00:00.000Z")?;
                conn.execute(
                    "INSERT INTO message (telegram_message_id, group_id, user_id, username, content, timestamp)
                     VALUES (1, 1, 10, 'u', 'x', '2026-01-01T00:00:01.000Z'),
                            (2, 1, 10, 'u', 'y', '2026-01-01T00:00:02.000Z')",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let groups = list_groups(&db).await.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group.id, 1);
        assert_eq!(groups[0].message_count, 2);
        assert_eq!(groups[1].group.id, 2);
        assert_eq!(groups[1].message_count, 0);
    }
}
