//! Tokenizer for raw HTML embedded in Markdown

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TAG_RE: Regex = Regex::new(
        r#"(?s)<!--.*?-->|<(/?)([A-Za-z][A-Za-z0-9-]*)((?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*(/?)>"#
    )
    .unwrap();
    static ref ATTR_RE: Regex =
        Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#).unwrap();
}

/// Elements that never have content or a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// One piece of a raw HTML fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlToken {
    Open {
        tag: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close(String),
    Text(String),
}

/// Split an HTML fragment into tags and text. Comments are dropped and
/// entities in text are decoded.
pub fn tokenize(fragment: &str) -> Vec<HtmlToken> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in TAG_RE.captures_iter(fragment) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            tokens.push(HtmlToken::Text(decode_entities(
                &fragment[last..whole.start()],
            )));
        }
        last = whole.end();

        // Comment
        let Some(name) = caps.get(2) else {
            continue;
        };
        let tag = name.as_str().to_ascii_lowercase();

        if caps.get(1).is_some_and(|m| !m.as_str().is_empty()) {
            tokens.push(HtmlToken::Close(tag));
            continue;
        }

        let attrs = caps
            .get(3)
            .map(|m| parse_attributes(m.as_str()))
            .unwrap_or_default();
        let self_closing = caps.get(4).is_some_and(|m| !m.as_str().is_empty()) || is_void(&tag);

        tokens.push(HtmlToken::Open {
            tag,
            attrs,
            self_closing,
        });
    }

    if last < fragment.len() {
        tokens.push(HtmlToken::Text(decode_entities(&fragment[last..])));
    }

    tokens
}

fn parse_attributes(s: &str) -> Vec<(String, String)> {
    ATTR_RE
        .captures_iter(s)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            Some((name, value))
        })
        .collect()
}

/// Whether the element has no closing tag
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Decode the character references that commonly appear in hand-written HTML
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let decoded = rest.find(';').filter(|&end| end <= 10).and_then(|end| {
            let entity = &rest[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, end))
        });

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_details_block() {
        let tokens = tokenize("<details open><summary>Solution</summary>");
        assert_eq!(
            tokens,
            vec![
                HtmlToken::Open {
                    tag: "details".into(),
                    attrs: vec![("open".into(), String::new())],
                    self_closing: false,
                },
                HtmlToken::Open {
                    tag: "summary".into(),
                    attrs: vec![],
                    self_closing: false,
                },
                HtmlToken::Text("Solution".into()),
                HtmlToken::Close("summary".into()),
            ]
        );
    }

    #[test]
    fn test_tokenize_attributes() {
        let tokens = tokenize(r#"<A HREF="https://x.dev?a=1&amp;b=2" class='c' data-x=y>"#);
        let HtmlToken::Open { tag, attrs, .. } = &tokens[0] else {
            panic!("expected open tag");
        };
        assert_eq!(tag, "a");
        assert_eq!(
            attrs,
            &vec![
                ("href".to_string(), "https://x.dev?a=1&b=2".to_string()),
                ("class".to_string(), "c".to_string()),
                ("data-x".to_string(), "y".to_string()),
            ]
        );
    }

    #[test]
    fn test_void_and_self_closing() {
        let tokens = tokenize("<br><img src=\"a.png\"/><span/>");
        assert!(tokens
            .iter()
            .all(|t| matches!(t, HtmlToken::Open { self_closing: true, .. })));
    }

    #[test]
    fn test_comments_dropped_and_text_kept() {
        let tokens = tokenize("a <!-- hidden --> b < c");
        assert_eq!(
            tokens,
            vec![HtmlToken::Text("a ".into()), HtmlToken::Text(" b < c".into())]
        );
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &lt; b &amp;&amp; c"), "a < b && c");
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
        assert_eq!(decode_entities("AT&T; &unknown;"), "AT&T; &unknown;");
    }
}
