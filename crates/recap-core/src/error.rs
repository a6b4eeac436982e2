// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Recap chat summarizer.

use thiserror::Error;

/// The primary error type used across all Recap adapter traits and core operations.
#[derive(Debug, Error)]
pub enum RecapError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migrations).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel adapter errors (connection failure, message format, rate limiting).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Permanent LLM provider errors (bad request, auth failure, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Transient LLM provider errors (network failure, rate limiting, 5xx).
    #[error("provider unavailable: {message}")]
    ProviderUnavailable {
        message: String,
        status: Option<u16>,
    },

    /// The summarization step failed; the caller decides the user-facing fallback.
    #[error("summarization failed: {message}")]
    Summarization {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Result cache backend errors.
    #[error("cache error: {message}")]
    Cache {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RecapError {
    /// Returns true when retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RecapError::ProviderUnavailable { .. } | RecapError::Timeout { .. }
        )
    }
}

/// Convenience alias used throughout the workspace.
pub type RecapResult<T> = Result<T, RecapError>;
