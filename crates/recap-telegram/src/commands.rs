// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command parsing at the Telegram boundary.

use recap_core::BotCommand;
use teloxide::utils::command::BotCommands;

/// Commands as typed in Telegram, including the legacy `/ai_summarise` alias.
///
/// Parsing accepts an `@botname` suffix only when it names this bot.
#[derive(BotCommands, Clone, Copy, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case")]
pub enum TelegramCommand {
    #[command(description = "Summarize the last 20 messages")]
    Summarize,
    #[command(description = "Summarize the last 20 messages")]
    AiSummarise,
    #[command(description = "Summarize all messages from today")]
    SummarizeDay,
    #[command(description = "Summarize all messages from the last 7 days")]
    SummarizeWeek,
    #[command(description = "Start the bot and show welcome message")]
    Start,
    #[command(description = "Show available commands and usage")]
    Help,
}

impl From<TelegramCommand> for BotCommand {
    fn from(cmd: TelegramCommand) -> Self {
        match cmd {
            TelegramCommand::Summarize | TelegramCommand::AiSummarise => BotCommand::Summarize,
            TelegramCommand::SummarizeDay => BotCommand::SummarizeDay,
            TelegramCommand::SummarizeWeek => BotCommand::SummarizeWeek,
            TelegramCommand::Start => BotCommand::Start,
            TelegramCommand::Help => BotCommand::Help,
        }
    }
}

/// Builds the command menu registered with `setMyCommands`.
pub fn to_menu(commands: &[BotCommand]) -> Vec<teloxide::types::BotCommand> {
    commands
        .iter()
        .map(|cmd| teloxide::types::BotCommand::new(cmd.to_string(), cmd.description()))
        .collect()
}
