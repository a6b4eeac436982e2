// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Summary result cache for the Recap chat summarizer.
//!
//! [`MemoryCache`] is always available. [`RedisCache`] is compiled with the
//! `redis` feature.

use std::sync::Arc;
use std::time::Duration;

use recap_config::model::{CacheBackend, CacheConfig};
use recap_core::{CacheAdapter, RecapError};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_backend;

pub use memory::MemoryCache;
#[cfg(feature = "redis")]
pub use redis_backend::RedisCache;

/// Builds the configured cache backend.
///
/// For the memory backend a sweep task is started when
/// `sweep_interval_secs > 0`; it stops when `cancel` fires.
pub fn build_cache(
    config: &CacheConfig,
    cancel: CancellationToken,
) -> Result<Arc<dyn CacheAdapter>, RecapError> {
    match config.backend {
        CacheBackend::Memory => {
            let cache = MemoryCache::new();
            if config.sweep_interval_secs > 0 {
                cache.spawn_sweeper(Duration::from_secs(config.sweep_interval_secs), cancel);
            }
            info!(backend = "memory", ttl_secs = config.ttl_secs, "summary cache ready");
            Ok(Arc::new(cache))
        }
        CacheBackend::Redis => build_redis(config),
    }
}

#[cfg(feature = "redis")]
fn build_redis(config: &CacheConfig) -> Result<Arc<dyn CacheAdapter>, RecapError> {
    let url = config
        .redis_url
        .as_deref()
        .ok_or_else(|| RecapError::Config("cache.redis_url is required for the redis backend".into()))?;
    let cache = RedisCache::new(url, config.key_prefix.clone())?;
    info!(backend = "redis", ttl_secs = config.ttl_secs, "summary cache ready");
    Ok(Arc::new(cache))
}

#[cfg(not(feature = "redis"))]
fn build_redis(_config: &CacheConfig) -> Result<Arc<dyn CacheAdapter>, RecapError> {
    Err(RecapError::Config(
        "cache.backend = \"redis\" requires recap to be built with the `redis` feature".into(),
    ))
}
