// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timeout and bounded retry around a provider adapter.
//!
//! [`ResilientProvider`] wraps any [`ProviderAdapter`] and is itself one, so
//! callers such as the summarizer stay unaware of the retry policy.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use recap_config::model::OpenAiConfig;
use recap_core::{
    AdapterType, CompletionRequest, CompletionResponse, HealthStatus, PluginAdapter,
    ProviderAdapter, RecapError,
};
use tracing::{debug, warn};

/// Per-attempt timeout and exponential backoff settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Upper bound for a single provider call.
    pub timeout: Duration,
    /// Retries after the first attempt. Zero disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each further retry.
    pub base_backoff: Duration,
}

impl RetryPolicy {
    /// Delay to wait after the failed attempt number `attempt` (0-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.base_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 2,
            base_backoff: Duration::from_millis(500),
        }
    }
}

impl From<&OpenAiConfig> for RetryPolicy {
    fn from(config: &OpenAiConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            max_retries: config.max_retries,
            base_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}

/// Provider decorator adding a timeout to every call and retrying transient
/// failures with exponential backoff.
///
/// Only errors for which [`RecapError::is_transient`] holds are retried;
/// permanent failures surface immediately.
pub struct ResilientProvider<P: ?Sized> {
    inner: Arc<P>,
    policy: RetryPolicy,
}

impl<P: ProviderAdapter + ?Sized> ResilientProvider<P> {
    pub fn new(inner: Arc<P>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn attempt(&self, request: CompletionRequest) -> Result<CompletionResponse, RecapError> {
        match tokio::time::timeout(self.policy.timeout, self.inner.complete(request)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(RecapError::Timeout {
                duration: self.policy.timeout,
            }),
        }
    }
}

#[async_trait]
impl<P: ProviderAdapter + ?Sized> PluginAdapter for ResilientProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn version(&self) -> semver::Version {
        self.inner.version()
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, RecapError> {
        self.inner.health_check().await
    }

    async fn shutdown(&self) -> Result<(), RecapError> {
        self.inner.shutdown().await
    }
}

#[async_trait]
impl<P: ProviderAdapter + ?Sized> ProviderAdapter for ResilientProvider<P> {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, RecapError> {
        let mut attempt = 0u32;
        loop {
            match self.attempt(request.clone()).await {
                Ok(response) => {
                    if attempt > 0 {
                        debug!(provider = self.inner.name(), attempt, "provider call succeeded after retry");
                    }
                    return Ok(response);
                }
                Err(e) if e.is_transient() && attempt < self.policy.max_retries => {
                    let delay = self.policy.backoff_for(attempt);
                    attempt += 1;
                    warn!(
                        provider = self.inner.name(),
                        attempt,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient provider failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
