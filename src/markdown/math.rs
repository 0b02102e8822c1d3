//! Math delimiter scanning for plain text
//!
//! Recognized forms:
//! - `$...$` and `\(...\)` for inline math
//! - `$$...$$` and `\[...\]` for display math
//!
//! An inline `$` opener must not be followed by whitespace, and its closer
//! must not be preceded by whitespace or followed by a digit, so prices such
//! as `$5 and $6` stay text. A backslash escapes the next character; escaped
//! dollars are kept verbatim for the math engine to unescape.

/// A piece of scanned text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathSpan {
    Text(String),
    Inline(String),
    Display(String),
}

/// Split text into plain runs and math expressions
pub fn split_math(text: &str) -> Vec<MathSpan> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let found = match bytes[i] {
            b'\\' => match bytes.get(i + 1) {
                Some(b'(') => bracketed(text, i, "\\)").map(|(e, end)| (MathSpan::Inline(e), end)),
                Some(b'[') => bracketed(text, i, "\\]").map(|(e, end)| (MathSpan::Display(e), end)),
                Some(_) => {
                    i += 1 + char_len_at(text, i + 1);
                    continue;
                }
                None => None,
            },
            b'$' if bytes.get(i + 1) == Some(&b'$') => double_dollar(text, i),
            b'$' => single_dollar(text, i),
            _ => None,
        };

        match found {
            Some((span, end)) => {
                if plain_start < i {
                    spans.push(MathSpan::Text(text[plain_start..i].to_string()));
                }
                spans.push(span);
                i = end;
                plain_start = end;
            }
            None if bytes[i..].starts_with(b"$$") => i += 2,
            None => i += char_len_at(text, i),
        }
    }

    if plain_start < text.len() {
        spans.push(MathSpan::Text(text[plain_start..].to_string()));
    }
    spans
}

/// `\(..\)` or `\[..\]` starting at `start`
fn bracketed(text: &str, start: usize, closer: &str) -> Option<(String, usize)> {
    let body_start = start + 2;
    let len = text[body_start..].find(closer)?;
    let expr = &text[body_start..body_start + len];
    if expr.trim().is_empty() {
        return None;
    }
    Some((expr.to_string(), body_start + len + closer.len()))
}

fn double_dollar(text: &str, start: usize) -> Option<(MathSpan, usize)> {
    let body_start = start + 2;
    let len = text[body_start..].find("$$")?;
    let expr = &text[body_start..body_start + len];
    if expr.trim().is_empty() {
        return None;
    }
    Some((MathSpan::Display(expr.to_string()), body_start + len + 2))
}

fn single_dollar(text: &str, start: usize) -> Option<(MathSpan, usize)> {
    let body_start = start + 1;
    let first = text[body_start..].chars().next()?;
    if first.is_whitespace() {
        return None;
    }

    let bytes = text.as_bytes();
    let mut j = body_start;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 1 + char_len_at(text, j + 1),
            b'$' => {
                let before = text[..j].chars().next_back();
                let after = text[j + 1..].chars().next();
                let closes = before.is_some_and(|c| !c.is_whitespace())
                    && !after.is_some_and(|c| c.is_ascii_digit());
                if closes && j > body_start {
                    let expr = text[body_start..j].to_string();
                    return Some((MathSpan::Inline(expr), j + 1));
                }
                j += 1;
            }
            _ => j += char_len_at(text, j),
        }
    }
    None
}

/// Byte width of the character starting at `at`; `at` must be a char boundary
fn char_len_at(text: &str, at: usize) -> usize {
    text[at..].chars().next().map_or(1, char::len_utf8)
}
