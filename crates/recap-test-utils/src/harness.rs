// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full bot stack with mock channel and
//! provider, a temp SQLite database, and an in-memory cache.

use std::sync::Arc;
use std::time::Duration;

use recap_bot::{BotContext, BotLoop, FlowSettings, SummarizeFlow};
use recap_cache::MemoryCache;
use recap_config::model::StorageConfig;
use recap_core::{
    BotCommand, ChatId, CommandMessage, InboundEvent, ProviderAdapter, RecapError, Reply, Sender,
    StorageAdapter, TextMessage,
};
use recap_storage::SqliteStorage;
use recap_summarizer::{ResilientProvider, RetryPolicy, Summarizer, SummarizerSettings};

use crate::mock_channel::MockChannel;
use crate::mock_provider::{MockOutcome, MockProvider};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    outcomes: Vec<MockOutcome>,
    settings: FlowSettings,
    retry: Option<RetryPolicy>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            outcomes: Vec::new(),
            settings: FlowSettings::default(),
            retry: None,
        }
    }

    /// Set mock provider responses.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.outcomes = responses.into_iter().map(MockOutcome::Text).collect();
        self
    }

    /// Set scripted provider outcomes, including failures.
    pub fn with_outcomes(mut self, outcomes: Vec<MockOutcome>) -> Self {
        self.outcomes = outcomes;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.settings.ttl = ttl;
        self
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.settings.window_size = window_size;
        self
    }

    /// Wrap the provider in a [`ResilientProvider`] with this policy.
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, RecapError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| RecapError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_url: db_path.to_string_lossy().to_string(),
            wal_mode: true,
            read_pool_size: 2,
            busy_timeout_ms: 5000,
        }));
        storage.initialize().await?;

        let provider = Arc::new(MockProvider::with_outcomes(self.outcomes));
        let summarizer_provider: Arc<dyn ProviderAdapter> = match self.retry {
            Some(policy) => Arc::new(ResilientProvider::new(provider.clone(), policy)),
            None => provider.clone(),
        };

        let cache = Arc::new(MemoryCache::new());
        let channel = Arc::new(MockChannel::new());
        let flow = Arc::new(SummarizeFlow::new(
            storage.clone(),
            cache.clone(),
            Summarizer::new(summarizer_provider, SummarizerSettings::default()),
            self.settings,
        ));

        let ctx = BotContext {
            channel: channel.clone(),
            storage: storage.clone(),
            flow,
        };

        Ok(TestHarness {
            provider,
            channel,
            storage,
            cache,
            ctx,
            next_message_id: std::sync::atomic::AtomicI64::new(1),
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock adapters and temp storage.
pub struct TestHarness {
    /// The mock LLM provider.
    pub provider: Arc<MockProvider>,
    /// The mock channel capturing replies.
    pub channel: Arc<MockChannel>,
    /// SQLite storage on a temp file.
    pub storage: Arc<SqliteStorage>,
    /// The summary cache.
    pub cache: Arc<MemoryCache>,
    ctx: BotContext,
    next_message_id: std::sync::atomic::AtomicI64,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default settings and the default mock response.
    pub async fn new() -> Result<Self, RecapError> {
        Self::builder().build().await
    }

    /// A bot loop over the harness components, for tests driving `run`.
    pub fn bot_loop(&self) -> BotLoop {
        BotLoop::new(self.ctx.clone())
    }

    /// Delivers a text message from `username` to `chat_id`.
    pub async fn send_text(&self, chat_id: ChatId, username: &str, text: &str) {
        let message_id = self
            .next_message_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let event = InboundEvent::TextMessage(TextMessage {
            chat_id,
            chat_title: Some(format!("Chat {chat_id}")),
            message_id,
            sender: Sender {
                user_id: message_id,
                display_name: username.to_string(),
            },
            text: text.to_string(),
        });
        self.ctx.handle_event(event).await;
    }

    /// Issues `command` in `chat_id` and returns the reply it produced.
    pub async fn command(&self, chat_id: ChatId, command: BotCommand) -> Result<Reply, RecapError> {
        let before = self.channel.sent_count();
        self.ctx
            .handle_event(InboundEvent::Command(CommandMessage {
                chat_id,
                message_id: 0,
                sender: None,
                command,
            }))
            .await;

        let sent = self.channel.sent_replies().await;
        if sent.len() <= before {
            return Err(RecapError::Internal(format!("no reply to /{command}")));
        }
        sent.last()
            .cloned()
            .ok_or_else(|| RecapError::Internal("reply log empty".into()))
    }

    /// Stored messages of `chat_id`, newest first.
    pub async fn messages(&self, chat_id: ChatId) -> Result<Vec<recap_core::StoredMessage>, RecapError> {
        self.storage.fetch_recent(chat_id, 10_000).await
    }
}
