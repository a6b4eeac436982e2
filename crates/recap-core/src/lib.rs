// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Recap chat summarizer.
//!
//! This crate provides the adapter traits, error types, and common types
//! used throughout the Recap workspace.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{RecapError, RecapResult};
pub use types::{
    AdapterType, BotCommand, ChatGroup, ChatId, CommandMessage, CompletionRequest,
    CompletionResponse, GroupStats, HealthStatus, InboundEvent, MessageId, NewMessage, Reply,
    ReplyFormat, Sender, StoredMessage, TextMessage, TokenUsage,
};

pub use traits::{CacheAdapter, ChannelAdapter, PluginAdapter, ProviderAdapter, StorageAdapter};

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn adapter_type_round_trips_through_display() {
        for variant in [
            AdapterType::Channel,
            AdapterType::Provider,
            AdapterType::Storage,
            AdapterType::Cache,
        ] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn bot_command_names() {
        assert_eq!(BotCommand::Summarize.to_string(), "summarize");
        assert_eq!(BotCommand::SummarizeDay.to_string(), "summarize_day");
        assert_eq!(BotCommand::SummarizeWeek.to_string(), "summarize_week");
        assert_eq!(
            BotCommand::from_str("ai_summarise").unwrap(),
            BotCommand::Summarize
        );
        assert!(BotCommand::from_str("summarise_everything").is_err());
    }

    #[test]
    fn every_command_has_a_description() {
        for cmd in BotCommand::iter() {
            assert!(!cmd.description().is_empty(), "{cmd} has no description");
        }
    }

    #[test]
    fn only_provider_unavailable_and_timeout_are_transient() {
        assert!(
            RecapError::ProviderUnavailable {
                message: "503".into(),
                status: Some(503),
            }
            .is_transient()
        );
        assert!(
            RecapError::Timeout {
                duration: std::time::Duration::from_secs(30),
            }
            .is_transient()
        );
        assert!(
            !RecapError::Provider {
                message: "bad request".into(),
                source: None,
            }
            .is_transient()
        );
        assert!(!RecapError::Internal("boom".into()).is_transient());
    }

    #[test]
    fn text_message_converts_to_new_message() {
        let msg = TextMessage {
            chat_id: -100,
            chat_title: Some("Team".into()),
            message_id: 7,
            sender: Sender {
                user_id: 42,
                display_name: "alice".into(),
            },
            text: "hello".into(),
        };
        let row = msg.to_new_message();
        assert_eq!(row.chat_id, -100);
        assert_eq!(row.username, "alice");
        assert_eq!(row.text.as_deref(), Some("hello"));
        assert_eq!(row.message_id, 7);
    }

    #[test]
    fn reply_constructors_set_format() {
        assert_eq!(Reply::plain(1, "x").format, ReplyFormat::Plain);
        assert_eq!(Reply::html(1, "<b>x</b>").format, ReplyFormat::Html);
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_channel_adapter<T: ChannelAdapter>() {}
        fn _assert_provider_adapter<T: ProviderAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_cache_adapter<T: CacheAdapter>() {}
    }
}
