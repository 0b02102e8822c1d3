//! Allow-list sanitizer for syntax trees

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::ast::{push_merged, SyntaxNode};

/// Allow-list configuration (`sanitize:` in `_config.yml`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizeConfig {
    /// Tag names that may appear in output
    pub tags: BTreeSet<String>,
    /// Attribute names allowed per tag; `*` applies to every tag
    pub tag_attributes: BTreeMap<String, BTreeSet<String>>,
    /// Class values allowed per tag; a trailing `*` matches a prefix
    pub allowed_classes: BTreeMap<String, BTreeSet<String>>,
    /// Tags removed together with everything inside them
    pub clean_content_tags: BTreeSet<String>,
    /// Schemes allowed in `href`/`src`; relative URLs are always allowed
    pub url_schemes: BTreeSet<String>,
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        let tags = set(&[
            "a", "b", "blockquote", "br", "code", "del", "details", "div", "em", "h1", "h2", "h3",
            "h4", "h5", "h6", "hr", "i", "img", "kbd", "li", "ol", "p", "pre", "s", "span",
            "strong", "sub", "summary", "sup", "table", "tbody", "td", "th", "thead", "tr", "ul",
        ]);

        let tag_attributes = [
            ("a", set(&["href", "title"])),
            ("img", set(&["src", "alt", "title"])),
            ("details", set(&["open"])),
            ("ol", set(&["start"])),
            ("td", set(&["align"])),
            ("th", set(&["align"])),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let allowed_classes = [
            ("div", set(&["math", "math-display"])),
            ("span", set(&["math", "math-inline"])),
            ("code", set(&["hljs", "language-*"])),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            tags,
            tag_attributes,
            allowed_classes,
            clean_content_tags: set(&["script", "style"]),
            url_schemes: set(&["http", "https", "mailto"]),
        }
    }
}

/// Removes disallowed markup from a syntax tree. Never fails.
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    config: SanitizeConfig,
}

impl Sanitizer {
    pub fn new(config: SanitizeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SanitizeConfig {
        &self.config
    }

    /// Sanitize a whole tree
    pub fn sanitize(&self, node: SyntaxNode) -> SyntaxNode {
        match node {
            SyntaxNode::Document(children) => SyntaxNode::Document(self.sanitize_all(children)),
            other => {
                let mut out = self.sanitize_node(other);
                match out.len() {
                    1 => out.remove(0),
                    _ => SyntaxNode::Document(out),
                }
            }
        }
    }

    fn sanitize_all(&self, nodes: Vec<SyntaxNode>) -> Vec<SyntaxNode> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            for kept in self.sanitize_node(node) {
                push_merged(&mut out, kept);
            }
        }
        out
    }

    fn tag_allowed(&self, tag: &str) -> bool {
        self.config.tags.contains(tag)
    }

    fn attr_allowed(&self, tag: &str, attr: &str) -> bool {
        let allowed_for = |key: &str| {
            self.config
                .tag_attributes
                .get(key)
                .is_some_and(|attrs| attrs.contains(attr))
        };
        allowed_for(tag) || allowed_for("*")
    }

    fn class_allowed(&self, tag: &str, class: &str) -> bool {
        if self.attr_allowed(tag, "class") {
            return true;
        }
        self.config
            .allowed_classes
            .get(tag)
            .is_some_and(|classes| {
                classes.iter().any(|pattern| match pattern.strip_suffix('*') {
                    Some(prefix) => class.starts_with(prefix) && class.len() > prefix.len(),
                    None => pattern == class,
                })
            })
    }

    /// Browsers trim C0 controls and spaces around a URL and drop tabs and
    /// newlines inside it, so `java\tscript:` still runs as `javascript:`.
    /// Any control character left after trimming rejects the URL.
    fn url_allowed(&self, url: &str) -> bool {
        let url = url.trim_matches(|c: char| c <= ' ');
        if url.chars().any(|c| c.is_ascii_control()) {
            return false;
        }
        match url_scheme(url) {
            Some(scheme) => self.config.url_schemes.contains(&scheme.to_ascii_lowercase()),
            None => true,
        }
    }

    /// Sanitize one node into zero or more nodes
    fn sanitize_node(&self, node: SyntaxNode) -> Vec<SyntaxNode> {
        let Some(tag) = node.tag_name().map(|t| t.into_owned()) else {
            return match node {
                SyntaxNode::Document(children) => self.sanitize_all(children),
                other => vec![other],
            };
        };

        if self.config.clean_content_tags.contains(&tag) {
            tracing::debug!("Dropping <{}> and its content", tag);
            return Vec::new();
        }

        if !self.tag_allowed(&tag) {
            tracing::debug!("Dropping disallowed tag <{}>", tag);
            return self.unwrap_node(node);
        }

        match node {
            SyntaxNode::Paragraph(c) => vec![SyntaxNode::Paragraph(self.sanitize_all(c))],
            SyntaxNode::Heading { level, children } => vec![SyntaxNode::Heading {
                level,
                children: self.sanitize_all(children),
            }],
            SyntaxNode::BlockQuote(c) => vec![SyntaxNode::BlockQuote(self.sanitize_all(c))],
            SyntaxNode::List {
                ordered,
                start,
                items,
            } => vec![SyntaxNode::List {
                ordered,
                start: start.filter(|_| self.attr_allowed(&tag, "start")),
                items: self.sanitize_all(items),
            }],
            SyntaxNode::ListItem(c) => vec![SyntaxNode::ListItem(self.sanitize_all(c))],
            SyntaxNode::CodeBlock { language, text } => {
                let language = language.filter(|lang| {
                    self.tag_allowed("code") && self.class_allowed("code", &format!("language-{}", lang))
                });
                vec![SyntaxNode::CodeBlock { language, text }]
            }
            SyntaxNode::InlineCode(text) => vec![SyntaxNode::InlineCode(text)],
            SyntaxNode::MathInline(expr) => {
                if self.class_allowed("span", "math") && self.class_allowed("span", "math-inline") {
                    vec![SyntaxNode::MathInline(expr)]
                } else {
                    vec![SyntaxNode::PlainText(expr)]
                }
            }
            SyntaxNode::MathBlock(expr) => {
                if self.class_allowed("div", "math") && self.class_allowed("div", "math-display") {
                    vec![SyntaxNode::MathBlock(expr)]
                } else {
                    vec![SyntaxNode::Paragraph(vec![SyntaxNode::PlainText(expr)])]
                }
            }
            SyntaxNode::CollapsibleSection {
                summary,
                detail,
                open,
            } => {
                let summary = self.sanitize_all(summary);
                let detail = self.sanitize_all(detail);
                if self.tag_allowed("summary") {
                    vec![SyntaxNode::CollapsibleSection {
                        summary,
                        detail,
                        open: open && self.attr_allowed("details", "open"),
                    }]
                } else {
                    let mut out = vec![SyntaxNode::Paragraph(summary)];
                    out.extend(detail);
                    out
                }
            }
            SyntaxNode::Link {
                href,
                title,
                children,
            } => {
                let children = self.sanitize_all(children);
                if !self.attr_allowed(&tag, "href") || !self.url_allowed(&href) {
                    tracing::debug!("Dropping link to {:?}", href);
                    return children;
                }
                vec![SyntaxNode::Link {
                    href,
                    title: title.filter(|_| self.attr_allowed(&tag, "title")),
                    children,
                }]
            }
            SyntaxNode::Image { src, alt, title } => {
                if !self.attr_allowed(&tag, "src") || !self.url_allowed(&src) {
                    return vec![SyntaxNode::PlainText(alt)];
                }
                vec![SyntaxNode::Image {
                    src,
                    alt: if self.attr_allowed(&tag, "alt") {
                        alt
                    } else {
                        String::new()
                    },
                    title: title.filter(|_| self.attr_allowed(&tag, "title")),
                }]
            }
            SyntaxNode::Emphasis(c) => vec![SyntaxNode::Emphasis(self.sanitize_all(c))],
            SyntaxNode::Strong(c) => vec![SyntaxNode::Strong(self.sanitize_all(c))],
            SyntaxNode::Strikethrough(c) => vec![SyntaxNode::Strikethrough(self.sanitize_all(c))],
            SyntaxNode::Rule => vec![SyntaxNode::Rule],
            SyntaxNode::LineBreak => vec![SyntaxNode::LineBreak],
            SyntaxNode::Element {
                tag,
                attrs,
                children,
            } => {
                let attrs = self.sanitize_attributes(&tag, attrs);
                vec![SyntaxNode::Element {
                    tag,
                    attrs,
                    children: self.sanitize_all(children),
                }]
            }
            SyntaxNode::Document(_) | SyntaxNode::PlainText(_) => vec![node],
        }
    }

    fn sanitize_attributes(&self, tag: &str, attrs: Vec<(String, String)>) -> Vec<(String, String)> {
        attrs
            .into_iter()
            .filter_map(|(name, value)| {
                if name == "class" {
                    let classes: Vec<&str> = value
                        .split_whitespace()
                        .filter(|c| self.class_allowed(tag, c))
                        .collect();
                    return (!classes.is_empty()).then(|| (name, classes.join(" ")));
                }
                if !self.attr_allowed(tag, &name) {
                    tracing::debug!("Dropping attribute {} on <{}>", name, tag);
                    return None;
                }
                if matches!(name.as_str(), "href" | "src") && !self.url_allowed(&value) {
                    return None;
                }
                Some((name, value))
            })
            .collect()
    }

    /// Replacement for a node whose own tag is not allowed
    fn unwrap_node(&self, node: SyntaxNode) -> Vec<SyntaxNode> {
        match node {
            SyntaxNode::CodeBlock { text, .. } => {
                vec![SyntaxNode::Paragraph(vec![SyntaxNode::PlainText(text)])]
            }
            SyntaxNode::InlineCode(text) | SyntaxNode::MathInline(text) => {
                vec![SyntaxNode::PlainText(text)]
            }
            SyntaxNode::MathBlock(expr) => vec![SyntaxNode::Paragraph(vec![SyntaxNode::PlainText(expr)])],
            SyntaxNode::Image { alt, .. } => vec![SyntaxNode::PlainText(alt)],
            SyntaxNode::LineBreak => vec![SyntaxNode::text("\n")],
            SyntaxNode::Rule => Vec::new(),
            SyntaxNode::CollapsibleSection {
                summary, detail, ..
            } => {
                let mut out = vec![SyntaxNode::Paragraph(self.sanitize_all(summary))];
                out.extend(self.sanitize_all(detail));
                out
            }
            SyntaxNode::Document(c)
            | SyntaxNode::Paragraph(c)
            | SyntaxNode::BlockQuote(c)
            | SyntaxNode::ListItem(c)
            | SyntaxNode::Emphasis(c)
            | SyntaxNode::Strong(c)
            | SyntaxNode::Strikethrough(c)
            | SyntaxNode::Heading { children: c, .. }
            | SyntaxNode::Link { children: c, .. }
            | SyntaxNode::Element { children: c, .. }
            | SyntaxNode::List { items: c, .. } => self.sanitize_all(c),
            SyntaxNode::PlainText(_) => vec![node],
        }
    }
}

/// Scheme of an absolute URL, e.g. `https` or `javascript`
fn url_scheme(url: &str) -> Option<&str> {
    let url = url.trim_start();
    let colon = url.find(':')?;
    let scheme = &url[..colon];
    let first_delim = url.find(['/', '?', '#']).unwrap_or(url.len());
    let valid = colon < first_delim
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}
