//! Syntax tree produced from Markdown bodies

use std::borrow::Cow;

/// A node of the Markdown syntax tree.
///
/// Every node owns its children; the tree never shares nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxNode {
    /// Root of a document body
    Document(Vec<SyntaxNode>),
    Paragraph(Vec<SyntaxNode>),
    Heading {
        level: u8,
        children: Vec<SyntaxNode>,
    },
    BlockQuote(Vec<SyntaxNode>),
    List {
        ordered: bool,
        start: Option<u64>,
        items: Vec<SyntaxNode>,
    },
    ListItem(Vec<SyntaxNode>),
    /// Fenced or indented code. `text` is the exact source, trailing newline included.
    CodeBlock {
        language: Option<String>,
        text: String,
    },
    InlineCode(String),
    MathInline(String),
    MathBlock(String),
    /// `<details>` disclosure: summary always visible, detail hidden until expanded
    CollapsibleSection {
        summary: Vec<SyntaxNode>,
        detail: Vec<SyntaxNode>,
        open: bool,
    },
    Link {
        href: String,
        title: Option<String>,
        children: Vec<SyntaxNode>,
    },
    Image {
        src: String,
        alt: String,
        title: Option<String>,
    },
    Emphasis(Vec<SyntaxNode>),
    Strong(Vec<SyntaxNode>),
    Strikethrough(Vec<SyntaxNode>),
    Rule,
    LineBreak,
    PlainText(String),
    /// Any other markup: tables and raw HTML elements
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<SyntaxNode>,
    },
}

impl SyntaxNode {
    /// Shorthand for a text node
    pub fn text(s: impl Into<String>) -> Self {
        SyntaxNode::PlainText(s.into())
    }

    /// HTML tag this node stands for, if any
    pub fn tag_name(&self) -> Option<Cow<'_, str>> {
        let tag = match self {
            SyntaxNode::Document(_) | SyntaxNode::PlainText(_) => return None,
            SyntaxNode::Paragraph(_) => "p",
            SyntaxNode::Heading { level, .. } => return Some(Cow::Owned(format!("h{}", level))),
            SyntaxNode::BlockQuote(_) => "blockquote",
            SyntaxNode::List { ordered: true, .. } => "ol",
            SyntaxNode::List { ordered: false, .. } => "ul",
            SyntaxNode::ListItem(_) => "li",
            SyntaxNode::CodeBlock { .. } => "pre",
            SyntaxNode::InlineCode(_) => "code",
            SyntaxNode::MathInline(_) => "span",
            SyntaxNode::MathBlock(_) => "div",
            SyntaxNode::CollapsibleSection { .. } => "details",
            SyntaxNode::Link { .. } => "a",
            SyntaxNode::Image { .. } => "img",
            SyntaxNode::Emphasis(_) => "em",
            SyntaxNode::Strong(_) => "strong",
            SyntaxNode::Strikethrough(_) => "del",
            SyntaxNode::Rule => "hr",
            SyntaxNode::LineBreak => "br",
            SyntaxNode::Element { tag, .. } => return Some(Cow::Borrowed(tag.as_str())),
        };
        Some(Cow::Borrowed(tag))
    }

    /// Direct children, for container nodes
    pub fn children(&self) -> &[SyntaxNode] {
        match self {
            SyntaxNode::Document(c)
            | SyntaxNode::Paragraph(c)
            | SyntaxNode::BlockQuote(c)
            | SyntaxNode::ListItem(c)
            | SyntaxNode::Emphasis(c)
            | SyntaxNode::Strong(c)
            | SyntaxNode::Strikethrough(c) => c,
            SyntaxNode::Heading { children, .. }
            | SyntaxNode::Link { children, .. }
            | SyntaxNode::Element { children, .. } => children,
            SyntaxNode::List { items, .. } => items,
            SyntaxNode::CollapsibleSection { .. }
            | SyntaxNode::CodeBlock { .. }
            | SyntaxNode::InlineCode(_)
            | SyntaxNode::MathInline(_)
            | SyntaxNode::MathBlock(_)
            | SyntaxNode::Image { .. }
            | SyntaxNode::Rule
            | SyntaxNode::LineBreak
            | SyntaxNode::PlainText(_) => &[],
        }
    }

    /// Concatenated text of this node and everything below it
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            SyntaxNode::PlainText(s)
            | SyntaxNode::InlineCode(s)
            | SyntaxNode::MathInline(s)
            | SyntaxNode::MathBlock(s) => out.push_str(s),
            SyntaxNode::CodeBlock { text, .. } => out.push_str(text),
            SyntaxNode::Image { alt, .. } => out.push_str(alt),
            SyntaxNode::LineBreak => out.push('\n'),
            SyntaxNode::CollapsibleSection {
                summary, detail, ..
            } => {
                for child in summary.iter().chain(detail) {
                    child.collect_text(out);
                }
            }
            _ => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Whether this is a text node made only of whitespace
    pub fn is_blank_text(&self) -> bool {
        matches!(self, SyntaxNode::PlainText(s) if s.trim().is_empty())
    }

    /// Value of an attribute on a raw element
    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            SyntaxNode::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Whether this is a raw element with the given tag
    pub fn is_element(&self, name: &str) -> bool {
        matches!(self, SyntaxNode::Element { tag, .. } if tag == name)
    }
}

/// Append a node, merging adjacent text
pub(crate) fn push_merged(nodes: &mut Vec<SyntaxNode>, node: SyntaxNode) {
    if let SyntaxNode::PlainText(text) = &node {
        if text.is_empty() {
            return;
        }
        if let Some(SyntaxNode::PlainText(prev)) = nodes.last_mut() {
            prev.push_str(text);
            return;
        }
    }
    nodes.push(node);
}
