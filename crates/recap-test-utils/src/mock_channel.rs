// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` with injectable inbound events
//! and captured outbound replies for assertion in tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use recap_core::{
    AdapterType, BotCommand, ChannelAdapter, HealthStatus, InboundEvent, MessageId,
    PluginAdapter, RecapError, Reply,
};

/// A mock messaging channel for testing.
///
/// - **inbound**: events injected via `inject()` are returned by `receive()`
/// - **sent**: replies passed to `send()` are captured for `sent_replies()`
pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<InboundEvent>>>,
    sent: Arc<Mutex<Vec<Reply>>>,
    registered: Arc<Mutex<Vec<BotCommand>>>,
    notify: Arc<Notify>,
    sent_total: AtomicUsize,
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            registered: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
            sent_total: AtomicUsize::new(0),
        }
    }

    /// Inject an inbound event; the next `receive()` returns it.
    pub async fn inject(&self, event: InboundEvent) {
        self.inbound.lock().await.push_back(event);
        self.notify.notify_one();
    }

    /// All replies sent through `send()`, in order.
    pub async fn sent_replies(&self) -> Vec<Reply> {
        self.sent.lock().await.clone()
    }

    /// The most recent reply, if any.
    pub async fn last_reply(&self) -> Option<Reply> {
        self.sent.lock().await.last().cloned()
    }

    pub fn sent_count(&self) -> usize {
        self.sent_total.load(Ordering::SeqCst)
    }

    /// Commands passed to `register_commands()`.
    pub async fn registered_commands(&self) -> Vec<BotCommand> {
        self.registered.lock().await.clone()
    }

    /// Waits until at least `count` replies have been sent.
    pub async fn wait_for_replies(&self, count: usize) {
        while self.sent_count() < count {
            tokio::task::yield_now().await;
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, RecapError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RecapError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn connect(&mut self) -> Result<(), RecapError> {
        Ok(())
    }

    async fn send(&self, reply: Reply) -> Result<MessageId, RecapError> {
        let mut sent = self.sent.lock().await;
        sent.push(reply);
        self.sent_total.fetch_add(1, Ordering::SeqCst);
        Ok(MessageId(format!("mock-msg-{}", sent.len())))
    }

    async fn receive(&self) -> Result<InboundEvent, RecapError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(event) = queue.pop_front() {
                    return Ok(event);
                }
            }
            self.notify.notified().await;
        }
    }

    async fn register_commands(&self, commands: &[BotCommand]) -> Result<(), RecapError> {
        self.registered.lock().await.extend_from_slice(commands);
        Ok(())
    }
}
