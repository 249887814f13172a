//! Allow-list markup sanitizer
//!
//! The only markup that survives is `<strong>`, `<code>` and `<br/>`, with
//! every attribute removed. Script-like elements are dropped together with
//! their content, other elements are unwrapped (their text is kept), comments
//! and declarations vanish, and any `<`, `>` or bare `&` left in text is
//! escaped. Output is balanced, so sanitizing it again returns it unchanged.

use std::fmt;

/// Elements rendered as-is (attributes stripped)
const ALLOWED_TAGS: [&str; 3] = ["strong", "code", "br"];

/// Elements removed together with everything up to their closing tag
const DROPPED_WITH_CONTENT: [&str; 14] = [
    "script", "style", "iframe", "object", "embed", "noscript", "template", "textarea", "title",
    "xmp", "noembed", "noframes", "svg", "math",
];

/// Longest entity body accepted between `&` and `;`
const MAX_ENTITY_LEN: usize = 32;

/// Markup that has passed through [`sanitize`]
///
/// There is no other constructor, so holding a `SafeMarkup` proves the text
/// is safe to hand to a renderer that interprets markup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafeMarkup(String);

impl SafeMarkup {
    /// Borrow the markup
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the markup as a `String`
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SafeMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SafeMarkup {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A parsed start or end tag
struct Tag {
    name: String,
    closing: bool,
    /// Byte length of the tag including `<` and `>`
    len: usize,
}

/// Sanitize arbitrary markup against the allow-list
///
/// # Examples
///
/// ```
/// use parley::formatter::sanitize;
///
/// let safe = sanitize(r#"<strong onclick="x()">hi</strong><script>alert(1)</script>"#);
/// assert_eq!(safe.as_str(), "<strong>hi</strong>");
///
/// let again = sanitize(safe.as_str());
/// assert_eq!(again, safe);
/// ```
pub fn sanitize(input: &str) -> SafeMarkup {
    let mut out = String::with_capacity(input.len());
    let mut open: Vec<&'static str> = Vec::new();
    let mut rest = input;

    while let Some(pos) = rest.find(|c: char| matches!(c, '<' | '>' | '&')) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        rest = match tail.as_bytes()[0] {
            b'>' => {
                out.push_str("&gt;");
                &tail[1..]
            }
            b'&' => match entity_len(tail) {
                Some(len) => {
                    out.push_str(&tail[..len]);
                    &tail[len..]
                }
                None => {
                    out.push_str("&amp;");
                    &tail[1..]
                }
            },
            _ => consume_markup(tail, &mut out, &mut open),
        };
    }

    out.push_str(rest);

    while let Some(name) = open.pop() {
        push_end_tag(&mut out, name);
    }

    SafeMarkup(out)
}

/// Handle the construct starting at a `<` and return the unconsumed input
fn consume_markup<'a>(tail: &'a str, out: &mut String, open: &mut Vec<&'static str>) -> &'a str {
    if let Some(body) = tail.strip_prefix("<!--") {
        return match body.find("-->") {
            Some(end) => &body[end + 3..],
            None => "",
        };
    }

    if tail.starts_with("<!") || tail.starts_with("<?") {
        return match tail.find('>') {
            Some(end) => &tail[end + 1..],
            None => "",
        };
    }

    let Some(tag) = parse_tag(tail) else {
        out.push_str("&lt;");
        return &tail[1..];
    };

    let after = &tail[tag.len..];

    if DROPPED_WITH_CONTENT.contains(&tag.name.as_str()) {
        if tag.closing {
            return after;
        }
        let closer = format!("</{}", tag.name);
        return match find_ignore_ascii_case(after, &closer) {
            Some(start) => {
                let from_closer = &after[start..];
                match from_closer.find('>') {
                    Some(end) => &from_closer[end + 1..],
                    None => "",
                }
            }
            None => "",
        };
    }

    let Some(name) = ALLOWED_TAGS.iter().copied().find(|n| *n == tag.name) else {
        return after;
    };

    match (name, tag.closing) {
        ("br", false) => out.push_str("<br/>"),
        ("br", true) => {}
        (_, false) => {
            out.push('<');
            out.push_str(name);
            out.push('>');
            open.push(name);
        }
        (_, true) => {
            if open.contains(&name) {
                while let Some(top) = open.pop() {
                    push_end_tag(out, top);
                    if top == name {
                        break;
                    }
                }
            }
        }
    }

    after
}

fn push_end_tag(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Parse `<name ...>` or `</name ...>` at the start of `s`
///
/// Returns `None` when the `<` does not open a tag (no letter after it, or
/// no terminating `>`), in which case it is treated as text.
fn parse_tag(s: &str) -> Option<Tag> {
    let bytes = s.as_bytes();
    let mut i = 1;
    let closing = bytes.get(i) == Some(&b'/');
    if closing {
        i += 1;
    }

    if !bytes.get(i)?.is_ascii_alphabetic() {
        return None;
    }

    let name_start = i;
    while i < bytes.len()
        && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-' || bytes[i] == b':')
    {
        i += 1;
    }
    let name = s[name_start..i].to_ascii_lowercase();

    let mut quote: Option<u8> = None;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => {
                return Some(Tag {
                    name,
                    closing,
                    len: i + 1,
                });
            }
            None => {}
        }
        i += 1;
    }

    None
}

/// Length of a character reference at the start of `s`, if it is one
///
/// Accepts `&name;`, `&#123;` and `&#x1F600;`.
fn entity_len(s: &str) -> Option<usize> {
    let body = &s.as_bytes()[1..];
    let end = body
        .iter()
        .take(MAX_ENTITY_LEN + 1)
        .position(|b| *b == b';')?;
    let name = &body[..end];

    let valid = match name {
        [] => false,
        [b'#', b'x' | b'X', hex @ ..] => {
            !hex.is_empty() && hex.iter().all(u8::is_ascii_hexdigit)
        }
        [b'#', dec @ ..] => !dec.is_empty() && dec.iter().all(u8::is_ascii_digit),
        _ => name[0].is_ascii_alphabetic() && name.iter().all(u8::is_ascii_alphanumeric),
    };

    valid.then_some(end + 2)
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .to_ascii_lowercase()
        .find(&needle.to_ascii_lowercase())
}
