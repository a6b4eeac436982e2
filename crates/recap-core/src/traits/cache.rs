// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache adapter trait for summary result caching.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::RecapError;
use crate::traits::adapter::PluginAdapter;

/// A key-value cache with per-entry expiry.
///
/// Expired entries are never returned from [`CacheAdapter::get`].
#[async_trait]
pub trait CacheAdapter: PluginAdapter {
    /// Returns the value stored under `key` if present and not expired.
    async fn get(&self, key: &str) -> Result<Option<String>, RecapError>;

    /// Stores `value` under `key`, replacing any previous entry.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), RecapError>;
}
