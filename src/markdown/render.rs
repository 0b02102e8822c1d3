//! Block renderer: syntax nodes to presentation nodes
//!
//! Every `SyntaxNode` variant maps to exactly one `RenderedNode` in
//! [`BlockRenderer::render`]. Raw elements with no presentation of their own
//! render as their text content.

use std::sync::Arc;
use std::time::Duration;

use super::ast::SyntaxNode;
use super::highlight::HighlighterRegistry;
use crate::helpers::{attributes, escape_attr, escape_html, is_external};
use crate::widgets::{Clipboard, CopyAffordance, CopyState, DisclosureState};

/// Raw elements that keep their own tag in the output
const PASSTHROUGH_TAGS: &[&str] = &[
    "table", "thead", "tbody", "tfoot", "tr", "th", "td", "kbd", "sub", "sup", "span", "div",
];

const VOID_TAGS: &[&str] = &["br", "hr", "img"];

/// Text styles. Headings 1-6 each get their own variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Typography {
    Body1,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl Typography {
    /// Variant for a heading level; levels outside 1-6 clamp to the nearest
    pub fn heading(level: u8) -> Self {
        match level {
            0 | 1 => Typography::H1,
            2 => Typography::H2,
            3 => Typography::H3,
            4 => Typography::H4,
            5 => Typography::H5,
            _ => Typography::H6,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Typography::Body1 => "p",
            Typography::H1 => "h1",
            Typography::H2 => "h2",
            Typography::H3 => "h3",
            Typography::H4 => "h4",
            Typography::H5 => "h5",
            Typography::H6 => "h6",
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Typography::Body1 => "typography-body1",
            Typography::H1 => "typography-h1",
            Typography::H2 => "typography-h2",
            Typography::H3 => "typography-h3",
            Typography::H4 => "typography-h4",
            Typography::H5 => "typography-h5",
            Typography::H6 => "typography-h6",
        }
    }
}

/// A rendered code block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeView {
    pub language: Option<String>,
    /// Exact original text; this is what the copy button copies
    pub source: String,
    /// Class-annotated HTML when the language is registered
    pub highlighted: Option<String>,
    pub line_numbers: bool,
    pub copy: CopyState,
}

impl CodeView {
    /// Text shown on the page: the source without its final newline
    pub fn display_text(&self) -> &str {
        self.source.strip_suffix('\n').unwrap_or(&self.source)
    }

    /// Copy button bound to the exact source text
    pub fn affordance(&self, clipboard: Arc<dyn Clipboard>, delay: Duration) -> CopyAffordance {
        CopyAffordance::with_delay(self.source.as_str(), clipboard, delay)
    }

    fn to_html(&self, out: &mut String) {
        let language = self.language.as_deref().unwrap_or("text");
        out.push_str(&format!(
            r#"<div class="code-block" data-language="{}">"#,
            escape_attr(language)
        ));
        out.push_str(&format!(
            r#"<button type="button" class="copy-button" data-state="{}" data-copy="{}" aria-label="Copy code">{}</button>"#,
            match self.copy {
                CopyState::Idle => "idle",
                CopyState::Copied => "copied",
            },
            escape_attr(&self.source),
            self.copy.label()
        ));

        match &self.highlighted {
            Some(html) if self.line_numbers => {
                let code = html.strip_suffix('\n').unwrap_or(html);
                let gutter: Vec<String> = (1..=code.lines().count().max(1))
                    .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
                    .collect();
                out.push_str(&format!(
                    r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code"><pre class="hl-code">{}</pre></td></tr></table></figure>"#,
                    escape_attr(language),
                    gutter.join("\n"),
                    code
                ));
            }
            Some(html) => {
                let code = html.strip_suffix('\n').unwrap_or(html);
                out.push_str(&format!(
                    r#"<pre class="hl-code"><code class="language-{}">{}</code></pre>"#,
                    escape_attr(language),
                    code
                ));
            }
            None => {
                let class = self
                    .language
                    .as_deref()
                    .map(|l| format!(r#" class="language-{}""#, escape_attr(l)))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "<pre><code{}>{}</code></pre>",
                    class,
                    escape_html(self.display_text())
                ));
            }
        }
        out.push_str("</div>");
    }
}

/// Presentation-ready node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedNode {
    Fragment(Vec<RenderedNode>),
    Typography {
        variant: Typography,
        children: Vec<RenderedNode>,
    },
    Quote(Vec<RenderedNode>),
    List {
        ordered: bool,
        start: Option<u64>,
        items: Vec<RenderedNode>,
    },
    ListItem(Vec<RenderedNode>),
    CodeBlock(CodeView),
    InlineCode(String),
    /// Raw expression; typesetting happens in the browser
    Math {
        display: bool,
        expr: String,
    },
    /// Summary always visible, detail hidden until expanded
    Disclosure {
        summary: Vec<RenderedNode>,
        detail: Vec<RenderedNode>,
        state: DisclosureState,
    },
    Link {
        href: String,
        title: Option<String>,
        children: Vec<RenderedNode>,
    },
    Image {
        src: String,
        alt: String,
        title: Option<String>,
    },
    Emphasis(Vec<RenderedNode>),
    Strong(Vec<RenderedNode>),
    Strikethrough(Vec<RenderedNode>),
    Divider,
    LineBreak,
    Text(String),
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<RenderedNode>,
    },
}

impl RenderedNode {
    /// Serialize to an HTML fragment
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            RenderedNode::Fragment(children) => write_blocks(children, out),
            RenderedNode::Typography { variant, children } => {
                wrap(out, variant.tag(), &format!(r#" class="{}""#, variant.class()), children)
            }
            RenderedNode::Quote(children) => {
                out.push_str("<blockquote>\n");
                write_blocks(children, out);
                out.push_str("</blockquote>");
            }
            RenderedNode::List {
                ordered,
                start,
                items,
            } => {
                let (tag, attrs) = match (ordered, start) {
                    (true, Some(n)) if *n != 1 => ("ol", format!(r#" start="{}""#, n)),
                    (true, _) => ("ol", String::new()),
                    (false, _) => ("ul", String::new()),
                };
                out.push_str(&format!("<{}{}>\n", tag, attrs));
                write_blocks(items, out);
                out.push_str(&format!("</{}>", tag));
            }
            RenderedNode::ListItem(children) => wrap(out, "li", "", children),
            RenderedNode::CodeBlock(view) => view.to_html(out),
            RenderedNode::InlineCode(code) => {
                out.push_str(&format!("<code>{}</code>", escape_html(code)))
            }
            RenderedNode::Math { display: false, expr } => out.push_str(&format!(
                r#"<span class="math math-inline">\({}\)</span>"#,
                escape_html(expr)
            )),
            RenderedNode::Math { display: true, expr } => out.push_str(&format!(
                r#"<div class="math math-display">\[{}\]</div>"#,
                escape_html(expr)
            )),
            RenderedNode::Disclosure {
                summary,
                detail,
                state,
            } => {
                let open = if state.is_expanded() { " open" } else { "" };
                out.push_str(&format!(r#"<details class="disclosure"{}>"#, open));
                wrap(out, "summary", "", summary);
                out.push_str("\n<div class=\"disclosure-detail\">\n");
                write_blocks(detail, out);
                out.push_str("</div></details>");
            }
            RenderedNode::Link {
                href,
                title,
                children,
            } => {
                let mut attrs = vec![("href", href.as_str())];
                if let Some(title) = title {
                    attrs.push(("title", title.as_str()));
                }
                if is_external(href) {
                    attrs.push(("target", "_blank"));
                    attrs.push(("rel", "noopener"));
                }
                wrap(out, "a", &attributes(attrs), children);
            }
            RenderedNode::Image { src, alt, title } => {
                let title = title
                    .as_deref()
                    .map(|t| format!(r#" title="{}""#, escape_attr(t)))
                    .unwrap_or_default();
                out.push_str(&format!(
                    r#"<img src="{}" alt="{}"{}>"#,
                    escape_attr(src),
                    escape_attr(alt),
                    title
                ));
            }
            RenderedNode::Emphasis(children) => wrap(out, "em", "", children),
            RenderedNode::Strong(children) => wrap(out, "strong", "", children),
            RenderedNode::Strikethrough(children) => wrap(out, "del", "", children),
            RenderedNode::Divider => out.push_str("<hr>"),
            RenderedNode::LineBreak => out.push_str("<br>\n"),
            RenderedNode::Text(text) => out.push_str(&escape_html(text)),
            RenderedNode::Element {
                tag,
                attrs,
                children,
            } => {
                let attrs = attributes(attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
                if VOID_TAGS.contains(&tag.as_str()) {
                    out.push_str(&format!("<{}{}>", tag, attrs));
                } else {
                    wrap(out, tag, &attrs, children);
                }
            }
        }
    }

    /// Concatenated visible text
    pub fn text_content(&self) -> String {
        match self {
            RenderedNode::Text(s) | RenderedNode::InlineCode(s) => s.clone(),
            RenderedNode::Math { expr, .. } => expr.clone(),
            RenderedNode::CodeBlock(view) => view.source.clone(),
            RenderedNode::Image { alt, .. } => alt.clone(),
            RenderedNode::LineBreak => "\n".to_string(),
            RenderedNode::Divider => String::new(),
            RenderedNode::Disclosure {
                summary, detail, ..
            } => summary.iter().chain(detail).map(Self::text_content).collect(),
            RenderedNode::Fragment(c)
            | RenderedNode::Quote(c)
            | RenderedNode::ListItem(c)
            | RenderedNode::Emphasis(c)
            | RenderedNode::Strong(c)
            | RenderedNode::Strikethrough(c)
            | RenderedNode::Typography { children: c, .. }
            | RenderedNode::Link { children: c, .. }
            | RenderedNode::Element { children: c, .. }
            | RenderedNode::List { items: c, .. } => c.iter().map(Self::text_content).collect(),
        }
    }

    /// Every code block in document order
    pub fn code_blocks(&self) -> Vec<&CodeView> {
        let mut found = Vec::new();
        self.visit(&mut |node| {
            if let RenderedNode::CodeBlock(view) = node {
                found.push(view);
            }
        });
        found
    }

    /// Depth-first walk over this node and its descendants
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a RenderedNode)) {
        f(self);
        let children: Box<dyn Iterator<Item = &'a RenderedNode>> = match self {
            RenderedNode::Disclosure {
                summary, detail, ..
            } => Box::new(summary.iter().chain(detail)),
            RenderedNode::Fragment(c)
            | RenderedNode::Quote(c)
            | RenderedNode::ListItem(c)
            | RenderedNode::Emphasis(c)
            | RenderedNode::Strong(c)
            | RenderedNode::Strikethrough(c)
            | RenderedNode::Typography { children: c, .. }
            | RenderedNode::Link { children: c, .. }
            | RenderedNode::Element { children: c, .. }
            | RenderedNode::List { items: c, .. } => Box::new(c.iter()),
            _ => Box::new(std::iter::empty()),
        };
        for child in children {
            child.visit(f);
        }
    }

    fn is_block(&self) -> bool {
        matches!(
            self,
            RenderedNode::Typography { .. }
                | RenderedNode::Quote(_)
                | RenderedNode::List { .. }
                | RenderedNode::ListItem(_)
                | RenderedNode::CodeBlock(_)
                | RenderedNode::Math { display: true, .. }
                | RenderedNode::Disclosure { .. }
                | RenderedNode::Divider
        )
    }
}

fn wrap(out: &mut String, tag: &str, attrs: &str, children: &[RenderedNode]) {
    out.push_str(&format!("<{}{}>", tag, attrs));
    for child in children {
        child.write_html(out);
    }
    out.push_str(&format!("</{}>", tag));
}

/// Children on their own lines when they are blocks
fn write_blocks(children: &[RenderedNode], out: &mut String) {
    for child in children {
        child.write_html(out);
        if child.is_block() {
            out.push('\n');
        }
    }
}

/// Maps syntax nodes to presentation nodes
pub struct BlockRenderer<'a> {
    highlighter: &'a HighlighterRegistry,
    line_numbers: bool,
}

impl<'a> BlockRenderer<'a> {
    pub fn new(highlighter: &'a HighlighterRegistry, line_numbers: bool) -> Self {
        Self {
            highlighter,
            line_numbers,
        }
    }

    pub fn render(&self, node: &SyntaxNode) -> RenderedNode {
        match node {
            SyntaxNode::Document(c) => RenderedNode::Fragment(self.render_all(c)),
            SyntaxNode::Paragraph(c) => RenderedNode::Typography {
                variant: Typography::Body1,
                children: self.render_all(c),
            },
            SyntaxNode::Heading { level, children } => RenderedNode::Typography {
                variant: Typography::heading(*level),
                children: self.render_all(children),
            },
            SyntaxNode::BlockQuote(c) => RenderedNode::Quote(self.render_all(c)),
            SyntaxNode::List {
                ordered,
                start,
                items,
            } => RenderedNode::List {
                ordered: *ordered,
                start: *start,
                items: self.render_all(items),
            },
            SyntaxNode::ListItem(c) => RenderedNode::ListItem(self.render_all(c)),
            SyntaxNode::CodeBlock { language, text } => RenderedNode::CodeBlock(CodeView {
                language: language.clone(),
                source: text.clone(),
                highlighted: language.as_deref().and_then(|lang| {
                    let display = text.strip_suffix('\n').unwrap_or(text);
                    self.highlighter.highlight(display, lang)
                }),
                line_numbers: self.line_numbers,
                copy: CopyState::Idle,
            }),
            SyntaxNode::InlineCode(code) => RenderedNode::InlineCode(code.clone()),
            SyntaxNode::MathInline(expr) => RenderedNode::Math {
                display: false,
                expr: expr.clone(),
            },
            SyntaxNode::MathBlock(expr) => RenderedNode::Math {
                display: true,
                expr: expr.clone(),
            },
            SyntaxNode::CollapsibleSection {
                summary,
                detail,
                open,
            } => RenderedNode::Disclosure {
                summary: self.render_all(summary),
                detail: self.render_all(detail),
                state: DisclosureState::new(*open),
            },
            SyntaxNode::Link {
                href,
                title,
                children,
            } => RenderedNode::Link {
                href: href.clone(),
                title: title.clone(),
                children: self.render_all(children),
            },
            SyntaxNode::Image { src, alt, title } => RenderedNode::Image {
                src: src.clone(),
                alt: alt.clone(),
                title: title.clone(),
            },
            SyntaxNode::Emphasis(c) => RenderedNode::Emphasis(self.render_all(c)),
            SyntaxNode::Strong(c) => RenderedNode::Strong(self.render_all(c)),
            SyntaxNode::Strikethrough(c) => RenderedNode::Strikethrough(self.render_all(c)),
            SyntaxNode::Rule => RenderedNode::Divider,
            SyntaxNode::LineBreak => RenderedNode::LineBreak,
            SyntaxNode::PlainText(text) => RenderedNode::Text(text.clone()),
            SyntaxNode::Element { .. } => self.render_element(node),
        }
    }

    fn render_all(&self, nodes: &[SyntaxNode]) -> Vec<RenderedNode> {
        nodes.iter().map(|n| self.render(n)).collect()
    }

    /// Raw element: known tags get their typed presentation, the rest
    /// collapse to text
    fn render_element(&self, node: &SyntaxNode) -> RenderedNode {
        let SyntaxNode::Element {
            tag,
            attrs,
            children,
        } = node
        else {
            return RenderedNode::Text(node.text_content());
        };
        let attr = |name: &str| node.attr(name).map(str::to_string);
        let children_rendered = || self.render_all(children);

        match tag.as_str() {
            "p" => RenderedNode::Typography {
                variant: Typography::Body1,
                children: children_rendered(),
            },
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => RenderedNode::Typography {
                variant: Typography::heading(tag[1..].parse().unwrap_or(6)),
                children: children_rendered(),
            },
            "blockquote" => RenderedNode::Quote(children_rendered()),
            "ul" | "ol" => RenderedNode::List {
                ordered: tag == "ol",
                start: attr("start").and_then(|s| s.parse().ok()),
                items: children_rendered(),
            },
            "li" => RenderedNode::ListItem(children_rendered()),
            "em" | "i" => RenderedNode::Emphasis(children_rendered()),
            "strong" | "b" => RenderedNode::Strong(children_rendered()),
            "del" | "s" | "strike" => RenderedNode::Strikethrough(children_rendered()),
            "br" => RenderedNode::LineBreak,
            "hr" => RenderedNode::Divider,
            "a" => match attr("href") {
                Some(href) => RenderedNode::Link {
                    href,
                    title: attr("title"),
                    children: children_rendered(),
                },
                None => RenderedNode::Fragment(children_rendered()),
            },
            "img" => match attr("src") {
                Some(src) => RenderedNode::Image {
                    src,
                    alt: attr("alt").unwrap_or_default(),
                    title: attr("title"),
                },
                None => RenderedNode::Text(attr("alt").unwrap_or_default()),
            },
            t if PASSTHROUGH_TAGS.contains(&t) => RenderedNode::Element {
                tag: tag.clone(),
                attrs: attrs.clone(),
                children: children_rendered(),
            },
            _ => {
                tracing::debug!("Rendering unknown element <{}> as text", tag);
                RenderedNode::Text(node.text_content())
            }
        }
    }
}
