// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::{CacheBackend, RecapConfig};

/// Longest accepted summary cache lifetime (30 days).
pub const MAX_CACHE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Longest accepted retention threshold (100 years).
pub const MAX_RETENTION_DAYS: u32 = 36_500;

/// Validates a deserialized configuration, collecting every failure instead
/// of stopping at the first.
pub fn validate_config(config: &RecapConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.database_url.trim().is_empty() {
        fail("storage.database_url must not be empty".to_string());
    }

    if config.gateway.port == 0 {
        fail("gateway.port must not be 0".to_string());
    }

    if config.gateway.host.trim().is_empty() {
        fail("gateway.host must not be empty".to_string());
    }

    let temperature = config.openai.temperature;
    if !(0.0..=2.0).contains(&temperature) {
        fail(format!(
            "openai.temperature must be between 0 and 2, got {temperature}"
        ));
    }

    if config.openai.max_tokens == 0 {
        fail("openai.max_tokens must be greater than 0".to_string());
    }

    if config.openai.timeout_secs == 0 {
        fail("openai.timeout_secs must be greater than 0".to_string());
    }

    if config.cache.ttl_secs == 0 {
        fail("cache.ttl_secs must be greater than 0".to_string());
    }

    if config.cache.ttl_secs > MAX_CACHE_TTL_SECS {
        fail(format!(
            "cache.ttl_secs must be at most {MAX_CACHE_TTL_SECS}, got {}",
            config.cache.ttl_secs
        ));
    }

    if config.bot.window_size == 0 {
        fail("bot.window_size must be greater than 0".to_string());
    }

    if config.bot.extended_window_size == 0 {
        fail("bot.extended_window_size must be greater than 0".to_string());
    }

    if config.cache.backend == CacheBackend::Redis
        && config
            .cache
            .redis_url
            .as_deref()
            .is_none_or(|url| url.trim().is_empty())
    {
        fail("cache.redis_url is required when cache.backend = \"redis\"".to_string());
    }

    if config.retention.default_days == 0 {
        fail("retention.default_days must be greater than 0".to_string());
    }

    if config.retention.default_days > MAX_RETENTION_DAYS {
        fail(format!(
            "retention.default_days must be at most {MAX_RETENTION_DAYS}, got {}",
            config.retention.default_days
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &RecapConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&RecapConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_url_fails() {
        let mut config = RecapConfig::default();
        config.storage.database_url = "  ".to_string();
        assert!(messages(&config).iter().any(|m| m.contains("database_url")));
    }

    #[test]
    fn port_zero_fails() {
        let mut config = RecapConfig::default();
        config.gateway.port = 0;
        assert!(messages(&config).iter().any(|m| m.contains("gateway.port")));
    }

    #[test]
    fn temperature_out_of_range_fails() {
        let mut config = RecapConfig::default();
        config.openai.temperature = 2.5;
        assert!(messages(&config).iter().any(|m| m.contains("temperature")));
    }

    #[test]
    fn redis_backend_requires_url() {
        let mut config = RecapConfig::default();
        config.cache.backend = CacheBackend::Redis;
        assert!(messages(&config).iter().any(|m| m.contains("redis_url")));

        config.cache.redis_url = Some("redis://127.0.0.1:6379".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn oversized_cache_ttl_fails() {
        let mut config = RecapConfig::default();
        config.cache.ttl_secs = 10_000_000_000_000_000_000;
        assert!(messages(&config).iter().any(|m| m.contains("cache.ttl_secs")));

        config.cache.ttl_secs = MAX_CACHE_TTL_SECS;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn oversized_retention_fails() {
        let mut config = RecapConfig::default();
        config.retention.default_days = u32::MAX;
        assert!(
            messages(&config)
                .iter()
                .any(|m| m.contains("retention.default_days"))
        );
    }

    #[test]
    fn collects_all_errors() {
        let mut config = RecapConfig::default();
        config.cache.ttl_secs = 0;
        config.bot.window_size = 0;
        config.gateway.port = 0;
        assert_eq!(messages(&config).len(), 3);
    }
}
