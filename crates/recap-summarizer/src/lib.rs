// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation summarization for the Recap bot.
//!
//! [`Summarizer`] turns an ordered list of message lines into a short
//! bullet-point summary by delegating to a [`ProviderAdapter`]. Wrap the
//! provider in [`ResilientProvider`] to bound each call and retry transient
//! failures.

pub mod prompt;
pub mod resilience;

use std::sync::Arc;

use recap_config::model::OpenAiConfig;
use recap_core::{CompletionRequest, PluginAdapter, ProviderAdapter, RecapError};
use tracing::{debug, error};

pub use resilience::{ResilientProvider, RetryPolicy};

/// Generation parameters applied to every summarization request.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarizerSettings {
    /// Model override; `None` uses the provider's configured model.
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: 300,
            temperature: 0.7,
        }
    }
}

impl From<&OpenAiConfig> for SummarizerSettings {
    fn from(config: &OpenAiConfig) -> Self {
        Self {
            model: None,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Produces summaries of chat message windows.
pub struct Summarizer {
    provider: Arc<dyn ProviderAdapter>,
    settings: SummarizerSettings,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn ProviderAdapter>, settings: SummarizerSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &SummarizerSettings {
        &self.settings
    }

    /// Summarizes `lines` in the order given.
    ///
    /// Returns the model's text with surrounding whitespace removed. Empty
    /// input is rejected without contacting the provider. Provider failures
    /// are logged and surface as [`RecapError::Summarization`].
    pub async fn summarize(&self, lines: &[String]) -> Result<String, RecapError> {
        if lines.is_empty() {
            return Err(RecapError::Summarization {
                message: "no messages to summarize".to_string(),
                source: None,
            });
        }

        let request = CompletionRequest {
            model: self.settings.model.clone(),
            system_prompt: prompt::SYSTEM_PROMPT.to_string(),
            prompt: prompt::build_prompt(lines),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let response = match self.provider.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                error!(provider = self.provider.name(), error = %e, "summarization request failed");
                return Err(RecapError::Summarization {
                    message: "summarization failed".to_string(),
                    source: Some(Box::new(e)),
                });
            }
        };

        let summary = response.content.trim();
        if summary.is_empty() {
            error!(provider = self.provider.name(), "provider returned an empty summary");
            return Err(RecapError::Summarization {
                message: "summarization failed".to_string(),
                source: None,
            });
        }

        debug!(
            lines = lines.len(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "summary generated"
        );
        Ok(summary.to_string())
    }
}
