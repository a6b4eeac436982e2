// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt templates sent to the language model.

/// Fixes the assistant's role for every summarization request.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that summarizes conversations.";

const INSTRUCTION: &str = "Please summarize the following conversation in brief, clear bullet points. \
Focus on the main topics and key points discussed:";

/// Builds the user prompt from message lines, keeping their order.
pub fn build_prompt(lines: &[String]) -> String {
    format!("{INSTRUCTION}\n\n{}", lines.join("\n"))
}
