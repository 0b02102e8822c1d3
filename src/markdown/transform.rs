//! Inline transform stage: math and code nodes
//!
//! Runs after sanitizing. Math and code nodes produced here are terminal, so
//! running the stage on its own output changes nothing.

use super::ast::{push_merged, SyntaxNode};
use super::math::{split_math, MathSpan};

/// Language tag that turns a fenced block into display math
const MATH_LANGUAGE: &str = "math";

/// Rewrite math spans and code elements in a tree
pub fn transform_tree(node: SyntaxNode) -> SyntaxNode {
    match node {
        SyntaxNode::Document(children) => SyntaxNode::Document(transform_children(children)),
        other => {
            let mut out = transform_children(vec![other]);
            match out.len() {
                1 => out.remove(0),
                _ => SyntaxNode::Document(out),
            }
        }
    }
}

fn transform_children(nodes: Vec<SyntaxNode>) -> Vec<SyntaxNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        transform_node(node, &mut out);
    }
    out
}

fn transform_node(node: SyntaxNode, out: &mut Vec<SyntaxNode>) {
    let node = match node {
        SyntaxNode::PlainText(text) => {
            for span in split_math(&text) {
                push_merged(
                    out,
                    match span {
                        MathSpan::Text(t) => SyntaxNode::PlainText(t),
                        MathSpan::Inline(expr) => SyntaxNode::MathInline(expr),
                        MathSpan::Display(expr) => SyntaxNode::MathBlock(expr),
                    },
                );
            }
            return;
        }
        SyntaxNode::CodeBlock { language, text } => code_block(language.as_deref(), text),
        SyntaxNode::Paragraph(children) => {
            let children = transform_children(children);
            match lone_math_block(&children) {
                Some(expr) => SyntaxNode::MathBlock(expr.to_string()),
                None => SyntaxNode::Paragraph(children),
            }
        }
        SyntaxNode::Document(c) => SyntaxNode::Document(transform_children(c)),
        SyntaxNode::BlockQuote(c) => SyntaxNode::BlockQuote(transform_children(c)),
        SyntaxNode::ListItem(c) => SyntaxNode::ListItem(transform_children(c)),
        SyntaxNode::Emphasis(c) => SyntaxNode::Emphasis(transform_children(c)),
        SyntaxNode::Strong(c) => SyntaxNode::Strong(transform_children(c)),
        SyntaxNode::Strikethrough(c) => SyntaxNode::Strikethrough(transform_children(c)),
        SyntaxNode::Heading { level, children } => SyntaxNode::Heading {
            level,
            children: transform_children(children),
        },
        SyntaxNode::List {
            ordered,
            start,
            items,
        } => SyntaxNode::List {
            ordered,
            start,
            items: transform_children(items),
        },
        SyntaxNode::Link {
            href,
            title,
            children,
        } => SyntaxNode::Link {
            href,
            title,
            children: transform_children(children),
        },
        SyntaxNode::CollapsibleSection {
            summary,
            detail,
            open,
        } => SyntaxNode::CollapsibleSection {
            summary: transform_children(summary),
            detail: transform_children(detail),
            open,
        },
        SyntaxNode::Element {
            tag,
            attrs,
            children,
        } => element(tag, attrs, children),
        terminal @ (SyntaxNode::InlineCode(_)
        | SyntaxNode::MathInline(_)
        | SyntaxNode::MathBlock(_)
        | SyntaxNode::Image { .. }
        | SyntaxNode::Rule
        | SyntaxNode::LineBreak) => terminal,
    };
    push_merged(out, node);
}

/// First word of a fenced info string, e.g. `cpp` for `cpp {.numberLines}`
pub fn normalize_language(info: &str) -> Option<&str> {
    info.split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .filter(|lang| !lang.is_empty())
}

fn code_block(info: Option<&str>, text: String) -> SyntaxNode {
    match info.and_then(normalize_language) {
        Some(MATH_LANGUAGE) => {
            let expr = text.strip_suffix('\n').unwrap_or(&text);
            SyntaxNode::MathBlock(expr.to_string())
        }
        language => SyntaxNode::CodeBlock {
            language: language.map(str::to_string),
            text,
        },
    }
}

/// Expression of a paragraph that holds nothing but one display formula
fn lone_math_block(children: &[SyntaxNode]) -> Option<&str> {
    let mut significant = children.iter().filter(|c| !c.is_blank_text());
    match (significant.next(), significant.next()) {
        (Some(SyntaxNode::MathBlock(expr)), None) => Some(expr),
        _ => None,
    }
}

fn classes(attrs: &[(String, String)]) -> impl Iterator<Item = &str> {
    attrs
        .iter()
        .filter(|(name, _)| name == "class")
        .flat_map(|(_, value)| value.split_whitespace())
}

/// Rewrite a raw HTML element
fn element(tag: String, attrs: Vec<(String, String)>, children: Vec<SyntaxNode>) -> SyntaxNode {
    let has_class = |wanted: &str| classes(&attrs).any(|c| c == wanted);

    if has_class("math-display") || (tag == "div" && has_class("math")) {
        return SyntaxNode::MathBlock(text_of(&children));
    }
    if has_class("math-inline") || (tag == "span" && has_class("math")) {
        return SyntaxNode::MathInline(text_of(&children));
    }

    match tag.as_str() {
        "code" => SyntaxNode::InlineCode(text_of(&children)),
        "pre" => match preformatted(&children) {
            Some((language, text)) => code_block(language.as_deref(), text),
            None => SyntaxNode::Element {
                tag,
                attrs,
                children,
            },
        },
        _ => SyntaxNode::Element {
            tag,
            attrs,
            children: transform_children(children),
        },
    }
}

/// Language and text of `<pre><code class="language-x">..</code></pre>` or a
/// text-only `<pre>`
fn preformatted(children: &[SyntaxNode]) -> Option<(Option<String>, String)> {
    let mut significant = children.iter().filter(|c| !c.is_blank_text());
    match (significant.next(), significant.next()) {
        (
            Some(SyntaxNode::Element {
                tag,
                attrs,
                children,
            }),
            None,
        ) if tag == "code" => {
            let language = classes(attrs)
                .find_map(|c| c.strip_prefix("language-"))
                .filter(|lang| !lang.is_empty())
                .map(str::to_string);
            Some((language, text_of(children)))
        }
        _ if children.iter().all(|c| matches!(c, SyntaxNode::PlainText(_))) => {
            Some((None, text_of(children)))
        }
        _ => None,
    }
}

fn text_of(children: &[SyntaxNode]) -> String {
    children.iter().map(SyntaxNode::text_content).collect()
}
