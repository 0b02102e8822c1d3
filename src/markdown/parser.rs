//! Markdown to syntax tree

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use super::ast::{push_merged, SyntaxNode};
use super::html::{tokenize, HtmlToken};

/// Parse a Markdown body into a syntax tree rooted at `SyntaxNode::Document`.
///
/// Raw HTML is tokenized into `Element` nodes so the sanitizer can inspect it;
/// `<details>` elements become `CollapsibleSection` nodes.
pub fn parse_markdown(body: &str) -> SyntaxNode {
    // Front-matter is split off before this point, so no metadata blocks
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_MATH
        | Options::ENABLE_GFM;

    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(body, options) {
        builder.event(event);
    }
    builder.finish()
}

/// What a stack frame turns into when it is closed
#[derive(Debug)]
enum FrameKind {
    Document,
    Paragraph,
    Heading(u8),
    BlockQuote,
    List(Option<u64>),
    Item,
    CodeBlock(Option<String>),
    Emphasis,
    Strong,
    Strikethrough,
    Link { href: String, title: Option<String> },
    Image { src: String, title: Option<String> },
    /// Markdown construct without a dedicated node (tables)
    Markup(&'static str),
    /// Element opened by raw HTML
    Html {
        tag: String,
        attrs: Vec<(String, String)>,
    },
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    children: Vec<SyntaxNode>,
    /// Code block text accumulates here
    text: String,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            text: String::new(),
        }
    }

    fn is_html(&self) -> bool {
        matches!(self.kind, FrameKind::Html { .. })
    }

    fn into_node(self) -> SyntaxNode {
        let children = self.children;
        match self.kind {
            FrameKind::Document => SyntaxNode::Document(children),
            FrameKind::Paragraph => SyntaxNode::Paragraph(children),
            FrameKind::Heading(level) => SyntaxNode::Heading { level, children },
            FrameKind::BlockQuote => SyntaxNode::BlockQuote(children),
            FrameKind::List(start) => SyntaxNode::List {
                ordered: start.is_some(),
                start,
                items: children,
            },
            FrameKind::Item => SyntaxNode::ListItem(children),
            FrameKind::CodeBlock(language) => SyntaxNode::CodeBlock {
                language,
                text: self.text,
            },
            FrameKind::Emphasis => SyntaxNode::Emphasis(children),
            FrameKind::Strong => SyntaxNode::Strong(children),
            FrameKind::Strikethrough => SyntaxNode::Strikethrough(children),
            FrameKind::Link { href, title } => SyntaxNode::Link {
                href,
                title,
                children,
            },
            FrameKind::Image { src, title } => SyntaxNode::Image {
                src,
                alt: children.iter().map(SyntaxNode::text_content).collect(),
                title,
            },
            FrameKind::Markup(tag) => SyntaxNode::Element {
                tag: tag.to_string(),
                attrs: Vec::new(),
                children,
            },
            FrameKind::Html { tag, attrs } => html_element(tag, attrs, children),
        }
    }
}

/// Build the node for a closed raw HTML element
fn html_element(tag: String, attrs: Vec<(String, String)>, children: Vec<SyntaxNode>) -> SyntaxNode {
    if tag != "details" {
        return SyntaxNode::Element {
            tag,
            attrs,
            children,
        };
    }

    let open = attrs.iter().any(|(k, _)| k == "open");
    let mut summary = Vec::new();
    let mut detail = Vec::new();
    let mut found_summary = false;

    for child in children {
        match child {
            SyntaxNode::Element { tag, children, .. } if tag == "summary" && !found_summary => {
                summary = children;
                found_summary = true;
            }
            // Whitespace between the tags of an HTML block
            other if other.is_blank_text() && detail.is_empty() => {}
            other => detail.push(other),
        }
    }

    SyntaxNode::CollapsibleSection {
        summary,
        detail,
        open,
    }
}

struct TreeBuilder {
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Frame::new(FrameKind::Document)],
        }
    }

    fn top(&mut self) -> &mut Frame {
        // The document frame is only removed by `finish`
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn push_node(&mut self, node: SyntaxNode) {
        push_merged(&mut self.top().children, node);
    }

    fn open(&mut self, kind: FrameKind) {
        self.stack.push(Frame::new(kind));
    }

    /// Pop the top frame and attach it to its parent
    fn close_top(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        if let Some(frame) = self.stack.pop() {
            let node = frame.into_node();
            self.push_node(node);
        }
    }

    /// Close the innermost Markdown frame, auto-closing raw HTML left open inside it
    fn close_markdown(&mut self) {
        while self.stack.len() > 1 && self.stack[self.stack.len() - 1].is_html() {
            self.close_top();
        }
        self.close_top();
    }

    /// Close a raw HTML element if it is open within the current Markdown container
    fn close_html(&mut self, name: &str) {
        let position = self
            .stack
            .iter()
            .rposition(|f| match &f.kind {
                FrameKind::Html { tag, .. } => tag == name,
                _ => false,
            })
            .filter(|&pos| self.stack[pos + 1..].iter().all(Frame::is_html));

        match position {
            Some(pos) => {
                while self.stack.len() > pos {
                    self.close_top();
                }
            }
            None => tracing::debug!("Ignoring unmatched closing tag </{}>", name),
        }
    }

    fn raw_html(&mut self, fragment: &str) {
        for token in tokenize(fragment) {
            match token {
                HtmlToken::Open {
                    tag,
                    attrs,
                    self_closing: true,
                } => self.push_node(SyntaxNode::Element {
                    tag,
                    attrs,
                    children: Vec::new(),
                }),
                HtmlToken::Open { tag, attrs, .. } => self.open(FrameKind::Html { tag, attrs }),
                HtmlToken::Close(tag) => self.close_html(&tag),
                HtmlToken::Text(text) => {
                    // Newlines between block-level tags carry no content
                    if !text.trim().is_empty() || self.top().is_html() {
                        self.push_node(SyntaxNode::PlainText(text));
                    }
                }
            }
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            // Raw HTML blocks are transparent; their lines arrive as `Html` events
            Event::End(TagEnd::HtmlBlock) => {}
            Event::End(_) => self.close_markdown(),
            Event::Text(text) => {
                let top = self.top();
                if let FrameKind::CodeBlock(_) = top.kind {
                    top.text.push_str(&text);
                } else {
                    self.push_node(SyntaxNode::PlainText(text.into_string()));
                }
            }
            Event::Code(code) => self.push_node(SyntaxNode::InlineCode(code.into_string())),
            Event::InlineMath(expr) => self.push_node(SyntaxNode::MathInline(expr.into_string())),
            Event::DisplayMath(expr) => self.push_node(SyntaxNode::MathBlock(expr.into_string())),
            Event::Html(html) | Event::InlineHtml(html) => self.raw_html(&html),
            Event::SoftBreak => self.push_node(SyntaxNode::text("\n")),
            Event::HardBreak => self.push_node(SyntaxNode::LineBreak),
            Event::Rule => self.push_node(SyntaxNode::Rule),
            Event::FootnoteReference(label) => {
                self.push_node(SyntaxNode::PlainText(format!("[^{}]", label)))
            }
            Event::TaskListMarker(checked) => {
                self.push_node(SyntaxNode::text(if checked { "[x] " } else { "[ ] " }))
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let kind = match tag {
            Tag::HtmlBlock => return,
            Tag::Paragraph => FrameKind::Paragraph,
            Tag::Heading { level, .. } => FrameKind::Heading(level as u8),
            Tag::BlockQuote(_) => FrameKind::BlockQuote,
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => {
                let info = info.trim();
                FrameKind::CodeBlock((!info.is_empty()).then(|| info.to_string()))
            }
            Tag::CodeBlock(CodeBlockKind::Indented) => FrameKind::CodeBlock(None),
            Tag::List(start) => FrameKind::List(start),
            Tag::Item => FrameKind::Item,
            Tag::Emphasis => FrameKind::Emphasis,
            Tag::Strong => FrameKind::Strong,
            Tag::Strikethrough => FrameKind::Strikethrough,
            Tag::Link {
                dest_url, title, ..
            } => FrameKind::Link {
                href: dest_url.into_string(),
                title: (!title.is_empty()).then(|| title.into_string()),
            },
            Tag::Image {
                dest_url, title, ..
            } => FrameKind::Image {
                src: dest_url.into_string(),
                title: (!title.is_empty()).then(|| title.into_string()),
            },
            Tag::Table(_) => FrameKind::Markup("table"),
            Tag::TableHead => FrameKind::Markup("thead"),
            Tag::TableRow => FrameKind::Markup("tr"),
            Tag::TableCell
                if matches!(
                    self.stack.last().map(|f| &f.kind),
                    Some(FrameKind::Markup("thead"))
                ) =>
            {
                FrameKind::Markup("th")
            }
            Tag::TableCell => FrameKind::Markup("td"),
            // Footnote definitions, definition lists and metadata blocks
            // are not enabled; anything else keeps its content
            _ => FrameKind::Markup("div"),
        };
        self.open(kind);
    }

    fn finish(mut self) -> SyntaxNode {
        while self.stack.len() > 1 {
            self.close_top();
        }
        match self.stack.pop() {
            Some(frame) => frame.into_node(),
            None => SyntaxNode::Document(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(md: &str) -> Vec<SyntaxNode> {
        match parse_markdown(md) {
            SyntaxNode::Document(children) => children,
            other => panic!("expected document, got {:?}", other),
        }
    }

    #[test]
    fn test_heading_and_paragraph() {
        let nodes = blocks("# Title\n\nSome *em* text.");
        assert_eq!(
            nodes,
            vec![
                SyntaxNode::Heading {
                    level: 1,
                    children: vec![SyntaxNode::text("Title")],
                },
                SyntaxNode::Paragraph(vec![
                    SyntaxNode::text("Some "),
                    SyntaxNode::Emphasis(vec![SyntaxNode::text("em")]),
                    SyntaxNode::text(" text."),
                ]),
            ]
        );
    }

    #[test]
    fn test_dollar_math() {
        let nodes = blocks("Some $x^2$ text.\n\n$$\\sum_i a_i$$");
        assert_eq!(
            nodes[0],
            SyntaxNode::Paragraph(vec![
                SyntaxNode::text("Some "),
                SyntaxNode::MathInline("x^2".into()),
                SyntaxNode::text(" text."),
            ])
        );
        assert_eq!(
            nodes[1],
            SyntaxNode::Paragraph(vec![SyntaxNode::MathBlock("\\sum_i a_i".into())])
        );
    }

    #[test]
    fn test_fenced_code_keeps_exact_text() {
        let nodes = blocks("```cpp\nint main() {\n  return 0;\n}\n```\n");
        assert_eq!(
            nodes,
            vec![SyntaxNode::CodeBlock {
                language: Some("cpp".into()),
                text: "int main() {\n  return 0;\n}\n".into(),
            }]
        );
    }

    #[test]
    fn test_lists() {
        let nodes = blocks("3. a\n4. b\n");
        let SyntaxNode::List {
            ordered,
            start,
            items,
        } = &nodes[0]
        else {
            panic!("expected list");
        };
        assert!(*ordered);
        assert_eq!(*start, Some(3));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], SyntaxNode::ListItem(vec![SyntaxNode::text("a")]));
    }

    #[test]
    fn test_link() {
        let nodes = blocks("[LeetCode](https://leetcode.com \"home\")");
        assert_eq!(
            nodes[0],
            SyntaxNode::Paragraph(vec![SyntaxNode::Link {
                href: "https://leetcode.com".into(),
                title: Some("home".into()),
                children: vec![SyntaxNode::text("LeetCode")],
            }])
        );
    }

    #[test]
    fn test_details_block_becomes_collapsible_section() {
        let md = "<details>\n<summary>Solution</summary>\n\nUse a *stack*.\n\n</details>\n";
        let nodes = blocks(md);
        assert_eq!(nodes.len(), 1);
        let SyntaxNode::CollapsibleSection {
            summary,
            detail,
            open,
        } = &nodes[0]
        else {
            panic!("expected collapsible section, got {:?}", nodes[0]);
        };
        assert!(!open);
        assert_eq!(summary, &vec![SyntaxNode::text("Solution")]);
        assert!(detail.iter().any(|n| matches!(n, SyntaxNode::Paragraph(_))));
    }

    #[test]
    fn test_inline_html_nests_text() {
        let nodes = blocks("a <kbd>Ctrl</kbd> b");
        assert_eq!(
            nodes[0],
            SyntaxNode::Paragraph(vec![
                SyntaxNode::text("a "),
                SyntaxNode::Element {
                    tag: "kbd".into(),
                    attrs: vec![],
                    children: vec![SyntaxNode::text("Ctrl")],
                },
                SyntaxNode::text(" b"),
            ])
        );
    }

    #[test]
    fn test_unclosed_inline_html_is_closed_with_paragraph() {
        let nodes = blocks("a <span>b\n\nnext");
        assert_eq!(nodes.len(), 2);
        assert!(matches!(&nodes[0], SyntaxNode::Paragraph(c) if c.len() == 2));
        assert_eq!(nodes[1], SyntaxNode::Paragraph(vec![SyntaxNode::text("next")]));
    }

    #[test]
    fn test_script_block_is_an_element() {
        let nodes = blocks("<script>alert(1)</script>\n");
        assert!(nodes.iter().any(|n| n.is_element("script")));
    }
}
