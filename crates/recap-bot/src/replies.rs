// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed reply texts.

/// Reply when the recent window is empty.
pub const NO_MESSAGES_YET: &str = "No messages to summarize yet!";

/// Reply when a summary could not be produced. Never carries error details.
pub const SUMMARY_FAILED: &str = "Sorry, I couldn't generate a summary at this time.";

pub const WELCOME: &str = "👋 Hello! I'm your group chat summarizer bot.

I can help you keep track of conversations by providing AI-powered summaries. Here are my commands:

/summarize - Get a summary of the last 20 messages
/summarize_day - Get a summary of today's messages
/summarize_week - Get a summary of the last 7 days
/help - Show this help message

To get started:
1. Make sure I'm an admin in this group
2. Send some messages
3. Use any of the commands above to get a summary!";

pub const HELP: &str = "Available commands:
/summarize - Summarize the last 20 messages
/summarize_day - Summarize all messages sent since 00:00 UTC today
/summarize_week - Summarize all messages sent in the last 7 days
/help - Show this help message

How to use:
1. Add the bot to your group chat
2. Send some messages in the chat
3. Use any of the summarize commands to get an AI-generated summary";

/// Reply when a time-bounded window is empty.
pub fn no_messages_for(timeframe: &str) -> String {
    format!("No messages to summarize for {timeframe}! Send some messages first.")
}
