// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram HTML rendering of generated summaries.
//!
//! Telegram's HTML parse mode only needs `&`, `<` and `>` escaped. Model
//! output uses a small Markdown subset which is mapped onto the supported
//! tags (`<b>`, `<i>`, `<code>`); markers without a partner pass through.

const HEADER: &str = "📝 <b>Conversation Summary</b>";
const FOOTER: &str = "<i>Generated by AI Summary Bot</i>";

/// Escapes text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Formats raw model output as a bulleted summary with header and footer.
pub fn format_summary(raw: &str) -> String {
    let bullets: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("• {}", render_inline(&escape_html(strip_marker(line)))))
        .collect();

    format!("{HEADER}\n\n{}\n\n{FOOTER}", bullets.join("\n"))
}

/// Converts formatted HTML back to readable plain text.
///
/// Used when Telegram rejects a message's markup.
pub fn to_plain_text(html: &str) -> String {
    let mut out = html.to_string();
    for tag in ["<b>", "</b>", "<i>", "</i>", "<code>", "</code>"] {
        out = out.replace(tag, "");
    }
    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Removes one leading list marker (`•`, `-`, or `*` followed by a space).
fn strip_marker(line: &str) -> &str {
    if let Some(rest) = line.strip_prefix('•').or_else(|| line.strip_prefix('-')) {
        return rest.trim_start();
    }
    match line.strip_prefix("* ") {
        Some(rest) => rest.trim_start(),
        None => line,
    }
}

fn render_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut rest = text;
    let mut prev_alnum = false;

    while let Some(ch) = rest.chars().next() {
        if ch == '`' {
            if let Some((inner, tail)) = delimited(&rest[1..], "`") {
                out.push_str("<code>");
                out.push_str(inner);
                out.push_str("</code>");
                rest = tail;
                prev_alnum = false;
                continue;
            }
        } else if let Some(after) = rest.strip_prefix("**") {
            if let Some((inner, tail)) = delimited(after, "**") {
                out.push_str("<b>");
                out.push_str(&render_inline(inner));
                out.push_str("</b>");
                rest = tail;
                prev_alnum = false;
                continue;
            }
        } else if let Some(after) = rest.strip_prefix("__") {
            if let Some((inner, tail)) = delimited(after, "__") {
                out.push_str("<i>");
                out.push_str(&render_inline(inner));
                out.push_str("</i>");
                rest = tail;
                prev_alnum = false;
                continue;
            }
        } else if ch == '_' && !prev_alnum {
            if let Some(end) = closing_underscore(&rest[1..]) {
                out.push_str("<i>");
                out.push_str(&render_inline(&rest[1..1 + end]));
                out.push_str("</i>");
                rest = &rest[end + 2..];
                prev_alnum = false;
                continue;
            }
        }

        out.push(ch);
        prev_alnum = ch.is_alphanumeric();
        rest = &rest[ch.len_utf8()..];
    }

    out
}

/// Splits `text` at the first non-empty span closed by `delim`.
fn delimited<'a>(text: &'a str, delim: &str) -> Option<(&'a str, &'a str)> {
    let end = text.find(delim)?;
    if end == 0 {
        return None;
    }
    Some((&text[..end], &text[end + delim.len()..]))
}

/// Finds a `_` closing an italic span: not the first char, not followed by a
/// word character.
fn closing_underscore(text: &str) -> Option<usize> {
    text.char_indices()
        .filter(|&(i, c)| c == '_' && i > 0)
        .find(|&(i, _)| {
            text[i + 1..]
                .chars()
                .next()
                .is_none_or(|next| !next.is_alphanumeric() && next != '_')
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_lines_in_header_bullets_and_footer() {
        let out = format_summary("first point\nsecond point");
        assert_eq!(
            out,
            "📝 <b>Conversation Summary</b>\n\n• first point\n• second point\n\n<i>Generated by AI Summary Bot</i>"
        );
    }

    #[test]
    fn blank_lines_are_dropped_and_lines_trimmed() {
        let out = format_summary("\n   alpha   \n\n\tbeta\n");
        assert!(out.contains("• alpha\n• beta"));
    }

    #[test]
    fn existing_markers_are_normalized() {
        let out = format_summary("• one\n- two\n* three\n-four");
        assert!(out.contains("• one\n• two\n• three\n• four"));
        assert!(!out.contains("• •"));
        assert!(!out.contains("• -"));
    }

    #[test]
    fn html_special_characters_are_escaped() {
        let out = format_summary("a < b && c > d");
        assert!(out.contains("• a &lt; b &amp;&amp; c &gt; d"));
    }

    #[test]
    fn injected_tags_are_neutralized() {
        let out = format_summary("<script>alert(1)</script>");
        assert!(out.contains("&lt;script&gt;"));
        assert!(!out.contains("<script>"));
    }

    #[test]
    fn markdown_emphasis_becomes_tags() {
        assert_eq!(render_inline("**Budget** agreed"), "<b>Budget</b> agreed");
        assert_eq!(render_inline("__soon__"), "<i>soon</i>");
        assert_eq!(render_inline("maybe _later_ then"), "maybe <i>later</i> then");
        assert_eq!(render_inline("run `cargo fmt` first"), "run <code>cargo fmt</code> first");
    }

    #[test]
    fn bold_line_is_not_taken_for_a_marker() {
        let out = format_summary("**Release** is Friday");
        assert!(out.contains("• <b>Release</b> is Friday"));
    }

    #[test]
    fn unmatched_markers_pass_through() {
        assert_eq!(render_inline("2 ** 3"), "2 ** 3");
        assert_eq!(render_inline("a `tick"), "a `tick");
        assert_eq!(render_inline("x_y"), "x_y");
    }

    #[test]
    fn identifiers_with_underscores_stay_intact() {
        assert_eq!(render_inline("renamed snake_case_name"), "renamed snake_case_name");
    }

    #[test]
    fn code_content_is_not_formatted() {
        assert_eq!(render_inline("`**raw**`"), "<code>**raw**</code>");
    }

    #[test]
    fn plain_text_fallback_strips_tags() {
        let html = format_summary("**a** & <b>");
        let plain = to_plain_text(&html);
        assert_eq!(
            plain,
            "📝 Conversation Summary\n\n• a & <b>\n\nGenerated by AI Summary Bot"
        );
    }
}
