// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The summarize command flows.
//!
//! Each flow checks the result cache, fetches a message window on a miss,
//! summarizes it, formats the summary as Telegram HTML, replies, and caches
//! the formatted text. Empty windows and failures are never cached.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveTime, Utc};
use recap_config::model::{BotConfig, CacheConfig};
use recap_core::{
    BotCommand, CacheAdapter, ChatId, RecapError, Reply, StorageAdapter, StoredMessage,
};
use recap_summarizer::Summarizer;
use recap_telegram::html::format_summary;
use tracing::{debug, error, info, warn};

use crate::replies;

/// Which message window a summary covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryScope {
    /// The most recent `window_size` messages.
    Recent,
    /// Messages since 00:00 UTC today.
    Today,
    /// Messages since 00:00 UTC seven days ago.
    Week,
}

impl SummaryScope {
    pub fn from_command(command: BotCommand) -> Option<Self> {
        match command {
            BotCommand::Summarize => Some(SummaryScope::Recent),
            BotCommand::SummarizeDay => Some(SummaryScope::Today),
            BotCommand::SummarizeWeek => Some(SummaryScope::Week),
            BotCommand::Start | BotCommand::Help => None,
        }
    }

    /// Cache key for this scope in `chat_id` at `now`.
    ///
    /// Time-bounded scopes carry the UTC date their window starts on, so a
    /// summary cached before midnight is never served for the next day.
    pub fn cache_key(self, chat_id: ChatId, now: DateTime<Utc>) -> String {
        let window_start = |since: Option<DateTime<Utc>>| {
            since
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        };
        match self {
            SummaryScope::Recent => format!("summary_{chat_id}"),
            SummaryScope::Today => format!("summary_day_{chat_id}_{}", window_start(self.since(now))),
            SummaryScope::Week => format!("summary_week_{chat_id}_{}", window_start(self.since(now))),
        }
    }

    /// Human-readable window name used in replies and logs.
    pub fn timeframe(self) -> &'static str {
        match self {
            SummaryScope::Recent => "Last 20 Messages",
            SummaryScope::Today => "Today's Messages",
            SummaryScope::Week => "Last 7 Days' Messages",
        }
    }

    /// Lower time bound of the window, if it has one.
    pub fn since(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let start_of_day = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        match self {
            SummaryScope::Recent => None,
            SummaryScope::Today => Some(start_of_day),
            SummaryScope::Week => Some(start_of_day - chrono::Duration::days(7)),
        }
    }

    fn empty_reply(self) -> String {
        match self {
            SummaryScope::Recent => replies::NO_MESSAGES_YET.to_string(),
            SummaryScope::Today | SummaryScope::Week => replies::no_messages_for(self.timeframe()),
        }
    }

    /// Renders fetched rows as prompt lines. Time-bounded windows name the
    /// speaker so the model can attribute points.
    fn lines(self, messages: &[StoredMessage]) -> Vec<String> {
        messages
            .iter()
            .filter_map(|m| {
                let content = m.content.as_deref()?;
                Some(match self {
                    SummaryScope::Recent => content.to_string(),
                    SummaryScope::Today | SummaryScope::Week => {
                        format!("{}: {content}", m.username)
                    }
                })
            })
            .collect()
    }
}

/// Window sizes and cache lifetime for the summarize flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowSettings {
    pub window_size: usize,
    pub extended_window_size: usize,
    pub ttl: Duration,
}

impl FlowSettings {
    pub fn from_config(bot: &BotConfig, cache: &CacheConfig) -> Self {
        Self {
            window_size: bot.window_size,
            extended_window_size: bot.extended_window_size,
            ttl: Duration::from_secs(cache.ttl_secs),
        }
    }
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            window_size: 20,
            extended_window_size: 100,
            ttl: Duration::from_secs(3600),
        }
    }
}

/// Orchestrates cache, store, summarizer, and formatter for one command.
pub struct SummarizeFlow {
    storage: Arc<dyn StorageAdapter>,
    cache: Arc<dyn CacheAdapter>,
    summarizer: Summarizer,
    settings: FlowSettings,
}

impl SummarizeFlow {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        cache: Arc<dyn CacheAdapter>,
        summarizer: Summarizer,
        settings: FlowSettings,
    ) -> Self {
        Self {
            storage,
            cache,
            summarizer,
            settings,
        }
    }

    pub fn settings(&self) -> &FlowSettings {
        &self.settings
    }

    /// Runs the flow for `scope` in `chat_id` and returns the reply to send.
    pub async fn run(&self, chat_id: ChatId, scope: SummaryScope) -> Reply {
        self.run_at(chat_id, scope, Utc::now()).await
    }

    /// Same as [`run`](Self::run) with an explicit clock for time-bounded
    /// windows.
    pub async fn run_at(&self, chat_id: ChatId, scope: SummaryScope, now: DateTime<Utc>) -> Reply {
        let key = scope.cache_key(chat_id, now);

        match self.cache.get(&key).await {
            Ok(Some(cached)) => {
                debug!(chat_id, key = key.as_str(), "serving cached summary");
                return Reply::html(chat_id, cached);
            }
            Ok(None) => {}
            Err(e) => warn!(chat_id, key = key.as_str(), error = %e, "cache read failed, treating as miss"),
        }

        let messages = match self.fetch(chat_id, scope, now).await {
            Ok(messages) => messages,
            Err(e) => {
                error!(chat_id, timeframe = scope.timeframe(), error = %e, "failed to fetch messages");
                return Reply::plain(chat_id, replies::SUMMARY_FAILED);
            }
        };

        let lines = scope.lines(&messages);
        if lines.is_empty() {
            debug!(chat_id, timeframe = scope.timeframe(), "nothing to summarize");
            return Reply::plain(chat_id, scope.empty_reply());
        }

        let summary = match self.summarizer.summarize(&lines).await {
            Ok(summary) => summary,
            Err(e) => {
                error!(chat_id, timeframe = scope.timeframe(), error = %e, "summary generation failed");
                return Reply::plain(chat_id, replies::SUMMARY_FAILED);
            }
        };

        let formatted = format_summary(&summary);
        if let Err(e) = self.cache.set(&key, &formatted, self.settings.ttl).await {
            warn!(chat_id, key = key.as_str(), error = %e, "failed to cache summary");
        }

        info!(chat_id, timeframe = scope.timeframe(), messages = lines.len(), "summary generated");
        Reply::html(chat_id, formatted)
    }

    async fn fetch(
        &self,
        chat_id: ChatId,
        scope: SummaryScope,
        now: DateTime<Utc>,
    ) -> Result<Vec<StoredMessage>, RecapError> {
        match scope.since(now) {
            None => self.storage.fetch_recent(chat_id, self.settings.window_size).await,
            Some(since) => {
                self.storage
                    .fetch_since(chat_id, since, self.settings.extended_window_size)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use recap_cache::MemoryCache;
    use recap_config::model::StorageConfig;
    use recap_core::{
        AdapterType, HealthStatus, NewMessage, PluginAdapter, ReplyFormat,
    };
    use recap_storage::SqliteStorage;
    use recap_summarizer::SummarizerSettings;
    use recap_test_utils::{MockOutcome, MockProvider};
    use tempfile::TempDir;

    struct Fixture {
        flow: SummarizeFlow,
        storage: Arc<SqliteStorage>,
        cache: Arc<MemoryCache>,
        provider: Arc<MockProvider>,
        _dir: TempDir,
    }

    async fn fixture(outcomes: Vec<MockOutcome>) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_url: dir.path().join("flow.db").to_string_lossy().to_string(),
            ..StorageConfig::default()
        }));
        storage.initialize().await.unwrap();
        let cache = Arc::new(MemoryCache::new());
        let provider = Arc::new(MockProvider::with_outcomes(outcomes));
        let summarizer = Summarizer::new(provider.clone(), SummarizerSettings::default());
        let flow = SummarizeFlow::new(
            storage.clone(),
            cache.clone(),
            summarizer,
            FlowSettings::default(),
        );
        Fixture {
            flow,
            storage,
            cache,
            provider,
            _dir: dir,
        }
    }

    fn message(chat_id: ChatId, message_id: i64, username: &str, text: &str) -> NewMessage {
        NewMessage {
            chat_id,
            chat_title: Some("Team".to_string()),
            user_id: message_id,
            username: username.to_string(),
            message_id,
            text: Some(text.to_string()),
        }
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, h, m, 0).unwrap()
    }

    struct BrokenCache;

    #[async_trait]
    impl PluginAdapter for BrokenCache {
        fn name(&self) -> &str {
            "broken-cache"
        }
        fn version(&self) -> semver::Version {
            semver::Version::new(0, 1, 0)
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Cache
        }
        async fn health_check(&self) -> Result<HealthStatus, RecapError> {
            Ok(HealthStatus::Unhealthy("broken".into()))
        }
        async fn shutdown(&self) -> Result<(), RecapError> {
            Ok(())
        }
    }

    #[async_trait]
    impl CacheAdapter for BrokenCache {
        async fn get(&self, _key: &str) -> Result<Option<String>, RecapError> {
            Err(RecapError::Cache {
                message: "connection refused".into(),
                source: None,
            })
        }
        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), RecapError> {
            Err(RecapError::Cache {
                message: "connection refused".into(),
                source: None,
            })
        }
    }

    #[test]
    fn scope_keys_and_commands() {
        let now = at(15, 30);
        assert_eq!(SummaryScope::Recent.cache_key(-42, now), "summary_-42");
        assert_eq!(SummaryScope::Today.cache_key(7, now), "summary_day_7_2026-03-10");
        assert_eq!(SummaryScope::Week.cache_key(7, now), "summary_week_7_2026-03-03");
        assert_eq!(
            SummaryScope::from_command(BotCommand::Summarize),
            Some(SummaryScope::Recent)
        );
        assert_eq!(SummaryScope::from_command(BotCommand::Help), None);
    }

    #[test]
    fn time_bounds_use_utc_midnight() {
        let now = at(15, 30);
        assert_eq!(SummaryScope::Recent.since(now), None);
        assert_eq!(
            SummaryScope::Today.since(now),
            Some(Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap())
        );
        assert_eq!(
            SummaryScope::Week.since(now),
            Some(Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn empty_window_replies_without_provider_call() {
        let f = fixture(vec![]).await;

        let reply = f.flow.run(-1, SummaryScope::Recent).await;

        assert_eq!(reply.text, replies::NO_MESSAGES_YET);
        assert_eq!(reply.format, ReplyFormat::Plain);
        assert_eq!(f.provider.call_count(), 0);
        assert!(f.cache.is_empty());
    }

    #[tokio::test]
    async fn recent_window_sends_newest_first_texts() {
        let f = fixture(vec![MockOutcome::Text("- greetings".to_string())]).await;
        for (id, body) in [(1, "one"), (2, "two"), (3, "three")] {
            f.storage.store_message(&message(-1, id, "dave", body)).await.unwrap();
        }

        let reply = f.flow.run(-1, SummaryScope::Recent).await;

        assert_eq!(reply.format, ReplyFormat::Html);
        assert!(reply.text.contains("• greetings"));
        let requests = f.provider.requests().await;
        assert!(requests[0].prompt.ends_with("three\ntwo\none"));
    }

    #[tokio::test]
    async fn second_request_is_served_from_cache() {
        let f = fixture(vec![MockOutcome::Text("- cached point".to_string())]).await;
        f.storage.store_message(&message(-1, 1, "erin", "hi")).await.unwrap();

        let first = f.flow.run(-1, SummaryScope::Recent).await;
        let second = f.flow.run(-1, SummaryScope::Recent).await;

        assert_eq!(first, second);
        assert_eq!(f.provider.call_count(), 1);
        assert_eq!(f.cache.get("summary_-1").await.unwrap(), Some(first.text));
    }

    #[tokio::test]
    async fn failure_replies_with_apology_and_skips_cache() {
        let f = fixture(vec![MockOutcome::Permanent("quota exceeded".to_string())]).await;
        f.storage.store_message(&message(-1, 1, "erin", "hi")).await.unwrap();

        let reply = f.flow.run(-1, SummaryScope::Recent).await;

        assert_eq!(reply.text, replies::SUMMARY_FAILED);
        assert!(!reply.text.contains("quota"));
        assert!(f.cache.get("summary_-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fetch_failure_replies_with_apology() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_url: dir.path().join("never-opened.db").to_string_lossy().to_string(),
            ..StorageConfig::default()
        }));
        let provider = Arc::new(MockProvider::new());
        let flow = SummarizeFlow::new(
            storage,
            Arc::new(MemoryCache::new()),
            Summarizer::new(provider.clone(), SummarizerSettings::default()),
            FlowSettings::default(),
        );

        let reply = flow.run(-1, SummaryScope::Recent).await;

        assert_eq!(reply.text, replies::SUMMARY_FAILED);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn cache_errors_degrade_to_misses() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_url: dir.path().join("flow.db").to_string_lossy().to_string(),
            ..StorageConfig::default()
        }));
        storage.initialize().await.unwrap();
        storage.store_message(&message(-1, 1, "erin", "hi")).await.unwrap();
        let provider = Arc::new(MockProvider::new());
        let flow = SummarizeFlow::new(
            storage,
            Arc::new(BrokenCache),
            Summarizer::new(provider.clone(), SummarizerSettings::default()),
            FlowSettings::default(),
        );

        let first = flow.run(-1, SummaryScope::Recent).await;
        let second = flow.run(-1, SummaryScope::Recent).await;

        assert_eq!(first.format, ReplyFormat::Html);
        assert_eq!(first, second);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn day_window_filters_by_time_and_names_speakers() {
        let f = fixture(vec![]).await;
        f.storage
            .store_message_at(&message(-1, 1, "old", "yesterday"), at(0, 0) - chrono::Duration::hours(1))
            .await
            .unwrap();
        f.storage
            .store_message_at(&message(-1, 2, "frank", "morning"), at(9, 0))
            .await
            .unwrap();

        let reply = f.flow.run_at(-1, SummaryScope::Today, at(12, 0)).await;

        assert_eq!(reply.format, ReplyFormat::Html);
        let requests = f.provider.requests().await;
        assert!(requests[0].prompt.ends_with("frank: morning"));
        assert!(!requests[0].prompt.contains("yesterday"));
        assert!(f.cache.get("summary_day_-1_2026-03-10").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn day_summary_is_not_reused_after_midnight() {
        let f = fixture(vec![
            MockOutcome::Text("- yesterday topic".to_string()),
            MockOutcome::Text("- fresh topic".to_string()),
        ])
        .await;
        f.storage
            .store_message_at(&message(-1, 1, "hana", "late night"), at(23, 40))
            .await
            .unwrap();

        let before = f.flow.run_at(-1, SummaryScope::Today, at(23, 50)).await;
        assert!(before.text.contains("yesterday topic"));

        let after_midnight = at(0, 10) + chrono::Duration::days(1);
        f.storage
            .store_message_at(&message(-1, 2, "ivan", "good morning"), after_midnight)
            .await
            .unwrap();

        let after = f.flow.run_at(-1, SummaryScope::Today, after_midnight).await;
        assert!(after.text.contains("fresh topic"));
        assert!(!after.text.contains("yesterday topic"));
        assert_eq!(f.provider.call_count(), 2);

        let requests = f.provider.requests().await;
        assert!(requests[1].prompt.contains("ivan: good morning"));
        assert!(!requests[1].prompt.contains("late night"));
    }

    #[tokio::test]
    async fn empty_week_window_names_timeframe() {
        let f = fixture(vec![]).await;
        f.storage
            .store_message_at(&message(-1, 1, "old", "ancient"), at(0, 0) - chrono::Duration::days(30))
            .await
            .unwrap();

        let reply = f.flow.run_at(-1, SummaryScope::Week, at(12, 0)).await;

        assert_eq!(
            reply.text,
            "No messages to summarize for Last 7 Days' Messages! Send some messages first."
        );
        assert_eq!(f.provider.call_count(), 0);
    }

    #[tokio::test]
    async fn scopes_use_separate_cache_entries() {
        let f = fixture(vec![
            MockOutcome::Text("recent".to_string()),
            MockOutcome::Text("daily".to_string()),
        ])
        .await;
        f.storage.store_message(&message(-1, 1, "gina", "now")).await.unwrap();

        let recent = f.flow.run(-1, SummaryScope::Recent).await;
        let daily = f.flow.run(-1, SummaryScope::Today).await;

        assert_ne!(recent.text, daily.text);
        assert_eq!(f.provider.call_count(), 2);
    }
}
