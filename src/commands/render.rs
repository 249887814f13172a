//! Terminal rendering of sanitized reply markup
//!
//! Replies are stored as safe markup using only `<strong>`, `<code>` and
//! `<br/>`. This module turns that markup into styled terminal text.

use colored::Colorize;

/// A run of text sharing one style
#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    text: String,
    bold: bool,
    code: bool,
}

/// Splits markup into styled runs with entities decoded
fn segments(markup: &str) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::new();
    let mut bold = 0usize;
    let mut code = 0usize;
    let mut text = String::new();
    let mut rest = markup;

    while let Some(pos) = rest.find(|c: char| c == '<' || c == '&') {
        text.push_str(&rest[..pos]);
        rest = &rest[pos..];

        if rest.starts_with('&') {
            match decode_entity(rest) {
                Some((ch, len)) => {
                    text.push(ch);
                    rest = &rest[len..];
                }
                None => {
                    text.push('&');
                    rest = &rest[1..];
                }
            }
            continue;
        }

        let Some(end) = rest.find('>') else {
            break;
        };
        let tag = rest[1..end].trim().to_ascii_lowercase();
        rest = &rest[end + 1..];

        match tag.trim_end_matches('/').trim() {
            "br" => text.push('\n'),
            "strong" => {
                flush(&mut text, bold, code, &mut out);
                bold += 1;
            }
            "/strong" => {
                flush(&mut text, bold, code, &mut out);
                bold = bold.saturating_sub(1);
            }
            "code" => {
                flush(&mut text, bold, code, &mut out);
                code += 1;
            }
            "/code" => {
                flush(&mut text, bold, code, &mut out);
                code = code.saturating_sub(1);
            }
            _ => {}
        }
    }
    text.push_str(rest);
    flush(&mut text, bold, code, &mut out);
    out
}

fn flush(text: &mut String, bold: usize, code: usize, out: &mut Vec<Segment>) {
    if !text.is_empty() {
        out.push(Segment {
            text: std::mem::take(text),
            bold: bold > 0,
            code: code > 0,
        });
    }
}

/// Decodes the entity at the start of `s`, returning the character and
/// the number of bytes consumed
fn decode_entity(s: &str) -> Option<(char, usize)> {
    let end = s.find(';')?;
    let name = &s[1..end];
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let numeric = name.strip_prefix('#')?;
            let code = match numeric.strip_prefix(|c: char| c == 'x' || c == 'X') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => numeric.parse::<u32>().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some((ch, end + 1))
}

/// Renders markup as plain text: line breaks applied, tags removed,
/// entities decoded
///
/// # Examples
///
/// ```
/// use parley::commands::render::render_plain;
///
/// assert_eq!(
///     render_plain("<strong>Note</strong><br/>1 &lt; 2"),
///     "Note\n1 < 2"
/// );
/// ```
pub fn render_plain(markup: &str) -> String {
    segments(markup).into_iter().map(|s| s.text).collect()
}

/// Renders markup as styled terminal text
///
/// Bold runs use the terminal bold attribute and code runs are cyan.
pub fn render(markup: &str) -> String {
    segments(markup)
        .into_iter()
        .map(|s| match (s.bold, s.code) {
            (false, false) => s.text,
            (true, false) => s.text.bold().to_string(),
            (false, true) => s.text.cyan().to_string(),
            (true, true) => s.text.bold().cyan().to_string(),
        })
        .collect()
}
