// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Redis-backed summary cache with connection pooling.
//!
//! Expiry is delegated to Redis (`SET key value EX ttl`), so summaries are
//! shared across processes and survive restarts of the bot.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Config as PoolConfig, Pool, Runtime};
use redis::AsyncCommands;

use recap_core::{AdapterType, CacheAdapter, HealthStatus, PluginAdapter, RecapError};

fn cache_err(action: &str, e: impl std::error::Error + Send + Sync + 'static) -> RecapError {
    RecapError::Cache {
        message: format!("failed to {action}"),
        source: Some(Box::new(e)),
    }
}

/// Redis cache using a `deadpool-redis` pool.
#[derive(Clone)]
pub struct RedisCache {
    pool: Pool,
    key_prefix: String,
}

impl RedisCache {
    /// Creates the pool. No connection is made until the first command.
    pub fn new(connection_url: &str, key_prefix: impl Into<String>) -> Result<Self, RecapError> {
        let pool = PoolConfig::from_url(connection_url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| cache_err("create Redis pool", e))?;
        Ok(Self {
            pool,
            key_prefix: key_prefix.into(),
        })
    }

    /// Namespaced key: `{prefix}:{key}`, or `key` when the prefix is empty.
    pub fn build_key(&self, key: &str) -> String {
        if self.key_prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.key_prefix, key)
        }
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection, RecapError> {
        self.pool
            .get()
            .await
            .map_err(|e| cache_err("get connection from pool", e))
    }
}

#[async_trait]
impl PluginAdapter for RedisCache {
    fn name(&self) -> &str {
        "redis"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Cache
    }

    async fn health_check(&self) -> Result<HealthStatus, RecapError> {
        let mut conn = match self.connection().await {
            Ok(conn) => conn,
            Err(e) => return Ok(HealthStatus::Unhealthy(e.to_string())),
        };
        let pong: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
        Ok(match pong {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), RecapError> {
        self.pool.close();
        Ok(())
    }
}

#[async_trait]
impl CacheAdapter for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, RecapError> {
        let mut conn = self.connection().await?;
        conn.get::<_, Option<String>>(self.build_key(key))
            .await
            .map_err(|e| cache_err("read from Redis", e))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), RecapError> {
        let mut conn = self.connection().await?;
        // EX 0 is rejected by Redis.
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(self.build_key(key), value, seconds)
            .await
            .map_err(|e| cache_err("write to Redis", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced() {
        let cache = RedisCache::new("redis://127.0.0.1:6379", "recap").unwrap();
        assert_eq!(cache.build_key("summary_42"), "recap:summary_42");

        let bare = RedisCache::new("redis://127.0.0.1:6379", "").unwrap();
        assert_eq!(bare.build_key("summary_42"), "summary_42");
    }

    #[tokio::test]
    async fn unreachable_server_reports_unhealthy() {
        let cache = RedisCache::new("redis://127.0.0.1:1", "recap").unwrap();
        assert!(matches!(
            cache.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
        assert!(cache.get("summary_1").await.is_err());
    }
}
