// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot maintenance commands: retention cleanup and group listing.

use recap_config::model::RecapConfig;
use recap_core::{ChatId, GroupStats, RecapError, StorageAdapter};

use crate::serve::open_storage;

/// Runs retention for one chat and returns the number of deleted messages.
pub async fn run_cleanup(
    config: &RecapConfig,
    chat_id: ChatId,
    days: Option<u32>,
) -> Result<u64, RecapError> {
    let days = days.unwrap_or(config.retention.default_days);
    let storage = open_storage(&config.storage).await?;
    let result = storage.cleanup_old_messages(chat_id, days).await;
    storage.close().await?;
    result
}

/// Prints every known group with its stored message count.
pub async fn run_groups(config: &RecapConfig, json: bool) -> Result<(), RecapError> {
    let storage = open_storage(&config.storage).await?;
    let result = storage.list_groups().await;
    storage.close().await?;
    let groups = result?;

    if json {
        let rendered = serde_json::to_string_pretty(&groups)
            .map_err(|e| RecapError::Internal(format!("failed to serialize groups: {e}")))?;
        println!("{rendered}");
    } else {
        print!("{}", render_table(&groups));
    }
    Ok(())
}

fn render_table(groups: &[GroupStats]) -> String {
    if groups.is_empty() {
        return "no groups recorded yet\n".to_string();
    }

    let mut out = format!("{:<16} {:>9}  {:<24} {}\n", "CHAT ID", "MESSAGES", "JOINED", "TITLE");
    for stats in groups {
        out.push_str(&format!(
            "{:<16} {:>9}  {:<24} {}\n",
            stats.group.id,
            stats.message_count,
            stats.group.join_date,
            stats.group.title.as_deref().unwrap_or("-"),
        ));
    }
    out
}
