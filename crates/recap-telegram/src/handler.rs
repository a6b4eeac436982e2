// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update classification and membership handling.
//!
//! Every Telegram message is turned into exactly one [`InboundEvent`]
//! here; downstream code never sees teloxide types.

use recap_core::{CommandMessage, InboundEvent, Sender, TextMessage};
use teloxide::prelude::*;
use teloxide::types::{ChatId, User, UserId};
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info};

use crate::commands::TelegramCommand;

/// Sent when the bot joins a group without administrator rights.
pub const ADMIN_REQUEST: &str =
    "⚠️ Please make me an administrator to ensure all features work correctly!";

/// Name recorded for a sender: username, then first name, then `"Unknown"`.
pub fn display_name(user: &User) -> String {
    user.username
        .as_deref()
        .filter(|name| !name.is_empty())
        .or(Some(user.first_name.as_str()).filter(|name| !name.is_empty()))
        .unwrap_or("Unknown")
        .to_string()
}

fn sender_of(msg: &Message) -> Option<Sender> {
    msg.from.as_ref().map(|user| Sender {
        user_id: user.id.0 as i64,
        display_name: display_name(user),
    })
}

/// Classifies a message.
///
/// Text starting with `/` is never stored: it becomes a command when it
/// parses as one addressed to this bot, and [`InboundEvent::Other`]
/// otherwise. Plain text without a sender is ignored.
pub fn classify(msg: &Message, bot_username: &str) -> InboundEvent {
    let Some(text) = msg.text() else {
        return InboundEvent::Other;
    };

    if text.starts_with('/') {
        return match TelegramCommand::parse(text, bot_username) {
            Ok(cmd) => InboundEvent::Command(CommandMessage {
                chat_id: msg.chat.id.0,
                message_id: i64::from(msg.id.0),
                sender: sender_of(msg),
                command: cmd.into(),
            }),
            Err(e) => {
                debug!(chat_id = msg.chat.id.0, error = %e, "ignoring unrecognized command");
                InboundEvent::Other
            }
        };
    }

    let Some(sender) = sender_of(msg) else {
        return InboundEvent::Other;
    };

    InboundEvent::TextMessage(TextMessage {
        chat_id: msg.chat.id.0,
        chat_title: msg.chat.title().map(str::to_string),
        message_id: i64::from(msg.id.0),
        sender,
        text: text.to_string(),
    })
}

/// Returns true when `bot_id` is among the newly added members.
pub fn bot_was_added(members: &[User], bot_id: UserId) -> bool {
    members.iter().any(|member| member.is_bot && member.id == bot_id)
}

/// Asks for administrator rights if the bot lacks them in `chat_id`.
///
/// Failures are logged; joining a group never fails the update.
pub async fn request_admin_if_needed(bot: &Bot, chat_id: ChatId, bot_id: UserId) {
    let admins = match bot.get_chat_administrators(chat_id).await {
        Ok(admins) => admins,
        Err(e) => {
            error!(chat_id = chat_id.0, error = %e, "failed to check admin status");
            return;
        }
    };

    if admins.iter().any(|member| member.user.id == bot_id) {
        info!(chat_id = chat_id.0, "added to group with admin rights");
        return;
    }

    info!(chat_id = chat_id.0, "added to group without admin rights, requesting promotion");
    if let Err(e) = bot.send_message(chat_id, ADMIN_REQUEST).await {
        error!(chat_id = chat_id.0, error = %e, "failed to send admin request");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recap_core::BotCommand;

    fn group_message(from: Option<serde_json::Value>, text: &str) -> Message {
        let mut json = serde_json::json!({
            "message_id": 7,
            "date": 1700000000i64,
            "chat": {
                "id": -100123i64,
                "type": "supergroup",
                "title": "Team Chat",
            },
            "text": text,
        });
        if let Some(from) = from {
            json["from"] = from;
        }
        serde_json::from_value(json).expect("failed to deserialize group message")
    }

    fn user(id: u64, username: Option<&str>, first_name: &str) -> serde_json::Value {
        let mut json = serde_json::json!({
            "id": id,
            "is_bot": false,
            "first_name": first_name,
        });
        if let Some(name) = username {
            json["username"] = serde_json::json!(name);
        }
        json
    }

    #[test]
    fn plain_text_becomes_text_message() {
        let msg = group_message(Some(user(42, Some("alice"), "Alice")), "hello all");
        match classify(&msg, "recap_bot") {
            InboundEvent::TextMessage(text) => {
                assert_eq!(text.chat_id, -100123);
                assert_eq!(text.chat_title.as_deref(), Some("Team Chat"));
                assert_eq!(text.message_id, 7);
                assert_eq!(text.sender.user_id, 42);
                assert_eq!(text.sender.display_name, "alice");
                assert_eq!(text.text, "hello all");
            }
            other => panic!("expected text message, got {other:?}"),
        }
    }

    #[test]
    fn sender_without_username_uses_first_name() {
        let msg = group_message(Some(user(42, None, "Bob")), "hi");
        match classify(&msg, "recap_bot") {
            InboundEvent::TextMessage(text) => assert_eq!(text.sender.display_name, "Bob"),
            other => panic!("expected text message, got {other:?}"),
        }
    }

    #[test]
    fn text_without_sender_is_ignored() {
        let msg = group_message(None, "anonymous");
        assert_eq!(classify(&msg, "recap_bot"), InboundEvent::Other);
    }

    #[test]
    fn command_is_classified() {
        let msg = group_message(Some(user(42, Some("alice"), "Alice")), "/summarize@recap_bot");
        match classify(&msg, "recap_bot") {
            InboundEvent::Command(cmd) => {
                assert_eq!(cmd.command, BotCommand::Summarize);
                assert_eq!(cmd.chat_id, -100123);
                assert_eq!(cmd.sender.map(|s| s.user_id), Some(42));
            }
            other => panic!("expected command, got {other:?}"),
        }
    }

    #[test]
    fn unknown_command_is_not_stored() {
        let msg = group_message(Some(user(42, Some("alice"), "Alice")), "/weather");
        assert_eq!(classify(&msg, "recap_bot"), InboundEvent::Other);
    }

    #[test]
    fn command_for_another_bot_is_ignored() {
        let msg = group_message(Some(user(42, Some("alice"), "Alice")), "/summarize@other_bot");
        assert_eq!(classify(&msg, "recap_bot"), InboundEvent::Other);
    }

    #[test]
    fn detects_bot_among_new_members() {
        let members: Vec<User> = serde_json::from_value(serde_json::json!([
            {"id": 1, "is_bot": false, "first_name": "Human"},
            {"id": 99, "is_bot": true, "first_name": "Recap", "username": "recap_bot"},
        ]))
        .unwrap();
        assert!(bot_was_added(&members, UserId(99)));
        assert!(!bot_was_added(&members, UserId(100)));
    }
}
