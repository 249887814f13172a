//! Model response formatting
//!
//! Converts raw model text into the restricted markup subset understood by
//! the renderer (`<strong>`, `<br/>`, `<code>`), then sanitizes it. The
//! rewrite rules run in a fixed order; each one sees the output of the
//! previous rule.

pub mod sanitize;

pub use sanitize::{sanitize, SafeMarkup};

use regex::Regex;
use std::sync::OnceLock;

/// Compiled rewrite rules, in application order
struct Rules {
    leading_bold: Regex,
    numbered_item: Regex,
    bullet_item: Regex,
    inline_code: Regex,
}

fn rules() -> &'static Rules {
    static RULES: OnceLock<Rules> = OnceLock::new();
    RULES.get_or_init(|| Rules {
        leading_bold: Regex::new(r"(?m)^\*\*(.*?)\*\*").expect("Invalid bold pattern"),
        numbered_item: Regex::new(r"(?m)^\d+\.\s+(.*$)").expect("Invalid numbered list pattern"),
        bullet_item: Regex::new(r"(?m)^\*\s+(.*$)").expect("Invalid bullet pattern"),
        inline_code: Regex::new(r"`([^`]+)`").expect("Invalid inline code pattern"),
    })
}

/// Format raw model output into sanitized markup
///
/// Rules, in order:
///
/// 1. `**text**` at the start of a line becomes `<strong>text</strong>`
/// 2. numbered list lines (`1. item`) are preceded by `<br/>`
/// 3. bullet lines (`* item`) become `<br/>• item`
/// 4. blank-line paragraph breaks become `<br/><br/>`
/// 5. remaining newlines collapse to a space
/// 6. `` `code` `` becomes `<code>code</code>`
/// 7. the result is sanitized
///
/// # Examples
///
/// ```
/// use parley::formatter::format_response;
///
/// let html = format_response("**Hi**\n\nHow are you?");
/// assert_eq!(html.as_str(), "<strong>Hi</strong><br/><br/>How are you?");
/// ```
pub fn format_response(raw: &str) -> SafeMarkup {
    let rules = rules();

    let text = rules
        .leading_bold
        .replace_all(raw, "<strong>${1}</strong>");
    let text = rules.numbered_item.replace_all(&text, "<br/>${0}");
    let text = rules.bullet_item.replace_all(&text, "<br/>• ${1}");
    // Pairs are replaced left to right, so no two newlines stay adjacent
    // and every newline left over is a single line wrap.
    let text = text.replace("\n\n", "<br/><br/>").replace('\n', " ");
    let text = rules.inline_code.replace_all(&text, "<code>${1}</code>");

    sanitize(&text)
}
