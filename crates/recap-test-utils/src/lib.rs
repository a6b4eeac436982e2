// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Recap integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without Telegram or OpenAI.
//!
//! # Components
//!
//! - [`MockProvider`] - Mock LLM provider replaying scripted outcomes
//! - [`MockChannel`] - Mock messaging channel with event injection and reply capture
//! - [`TestHarness`] - Full bot stack over temp SQLite and an in-memory cache

pub mod harness;
pub mod mock_channel;
pub mod mock_provider;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_channel::MockChannel;
pub use mock_provider::{MockOutcome, MockProvider};
