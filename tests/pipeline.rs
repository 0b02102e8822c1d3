//! End-to-end checks of the rendering pipeline

use std::sync::Arc;
use std::time::Duration;

use folio_rs::content::{ContentDocument, Difficulty, DocId, DocumentKind, FrontMatter};
use folio_rs::markdown::{
    parse_markdown, transform_tree, HighlighterRegistry, RenderedNode, Sanitizer, SyntaxNode,
    Typography,
};
use folio_rs::widgets::{Clipboard, ClipboardError, CopyState, MemoryClipboard};
use folio_rs::MarkdownPipeline;

#[test]
fn heading_and_inline_math() {
    let pipeline = MarkdownPipeline::default();

    let tree = pipeline.syntax_tree("# Title\n\nSome $x^2$ text.");
    assert_eq!(
        tree,
        SyntaxNode::Document(vec![
            SyntaxNode::Heading {
                level: 1,
                children: vec![SyntaxNode::text("Title")],
            },
            SyntaxNode::Paragraph(vec![
                SyntaxNode::text("Some "),
                SyntaxNode::MathInline("x^2".to_string()),
                SyntaxNode::text(" text."),
            ]),
        ])
    );

    let rendered = pipeline.render_tree("# Title\n\nSome $x^2$ text.");
    assert_eq!(
        rendered,
        RenderedNode::Fragment(vec![
            RenderedNode::Typography {
                variant: Typography::H1,
                children: vec![RenderedNode::Text("Title".to_string())],
            },
            RenderedNode::Typography {
                variant: Typography::Body1,
                children: vec![
                    RenderedNode::Text("Some ".to_string()),
                    RenderedNode::Math {
                        display: false,
                        expr: "x^2".to_string(),
                    },
                    RenderedNode::Text(" text.".to_string()),
                ],
            },
        ])
    );
}

#[test]
fn solution_code_block_starts_idle() {
    let text = "---\nid: 42\ndifficulty: \"Hard\"\n---\n\n```cpp\nint trap(vector<int>& h);\n```\n";
    let doc = ContentDocument::parse(
        text,
        std::path::Path::new("content/leetcode/42.md"),
        DocumentKind::Solution,
    )
    .unwrap();
    assert_eq!(doc.frontmatter.id, Some(DocId::Number(42)));
    assert_eq!(doc.frontmatter.difficulty, Some(Difficulty::Hard));

    let rendered = MarkdownPipeline::default().render_tree(&doc.body);
    let blocks = rendered.code_blocks();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].language.as_deref(), Some("cpp"));
    assert_eq!(blocks[0].copy, CopyState::Idle);
    assert_eq!(blocks[0].source, "int trap(vector<int>& h);\n");
}

#[tokio::test(start_paused = true)]
async fn copy_returns_to_idle_after_timeout() {
    let rendered = MarkdownPipeline::default().render_tree("```python\nprint('hi')\n```\n");
    let clipboard = Arc::new(MemoryClipboard::new());
    let copy = rendered.code_blocks()[0].affordance(clipboard.clone(), Duration::from_millis(1000));

    copy.trigger();
    assert_eq!(copy.state(), CopyState::Copied);
    assert_eq!(clipboard.contents().as_deref(), Some("print('hi')\n"));

    tokio::time::sleep(Duration::from_millis(999)).await;
    assert_eq!(copy.state(), CopyState::Copied);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(copy.state(), CopyState::Idle);
}

struct BrokenClipboard;

impl Clipboard for BrokenClipboard {
    fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError("denied".to_string()))
    }
}

#[tokio::test(start_paused = true)]
async fn clipboard_failure_still_reports_copied() {
    let rendered = MarkdownPipeline::default().render_tree("```cpp\nx;\n```\n");
    let copy = rendered.code_blocks()[0].affordance(Arc::new(BrokenClipboard), Duration::from_millis(1000));

    copy.trigger();
    assert_eq!(copy.state(), CopyState::Copied);
    tokio::time::sleep(Duration::from_millis(1001)).await;
    assert_eq!(copy.state(), CopyState::Idle);
}

#[test]
fn script_tags_are_removed() {
    let sanitizer = Sanitizer::default();
    let tree = sanitizer.sanitize(parse_markdown(
        "Before\n\n<script>alert(1)</script>\n\nAfter <script>steal()</script> text\n",
    ));

    let mut stack = vec![&tree];
    while let Some(node) = stack.pop() {
        assert_ne!(node.tag_name().as_deref(), Some("script"));
        stack.extend(node.children());
    }
    let text = tree.text_content();
    assert!(!text.contains("alert"));
    assert!(!text.contains("steal"));
    assert!(text.contains("Before"));
    assert!(text.contains("After"));
}

#[test]
fn unregistered_language_keeps_text() {
    let source = "  weird\t<tabs> & \"quotes\"\n\nlast line without newline";
    let body = format!("```haskell\n{}\n```\n", source);

    let pipeline = MarkdownPipeline::new(Sanitizer::default(), HighlighterRegistry::default(), true);
    let rendered = pipeline.render_tree(&body);
    let view = rendered.code_blocks()[0];
    assert_eq!(view.language.as_deref(), Some("haskell"));
    assert_eq!(view.highlighted, None);
    assert_eq!(view.source, format!("{}\n", source));
}

#[test]
fn language_match_is_case_sensitive() {
    let rendered = MarkdownPipeline::default().render_tree("```CPP\nint x;\n```\n");
    let view = rendered.code_blocks()[0];
    assert_eq!(view.language.as_deref(), Some("CPP"));
    assert_eq!(view.highlighted, None);
}

const MIXED: &str = r#"# Notes

Inline \(a+b\) and $$c$$ and an escaped \$5 price, $x$.

<div class="math-display" onclick="x()">E = mc^2</div>

<pre><code class="language-cpp">int main() {}
</code></pre>

<details open>
<summary>Hint <b>one</b></summary>

Use `std::sort` and <span style="color:red" class="hljs-keyword">this</span>.

</details>

<iframe src="https://example.com"></iframe>

| a | b |
|---|---|
| $1$ | <kbd>2</kbd> |
"#;

#[test]
fn sanitize_is_idempotent() {
    let sanitizer = Sanitizer::default();
    let once = sanitizer.sanitize(parse_markdown(MIXED));
    let twice = sanitizer.sanitize(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn transform_is_idempotent() {
    let sanitized = Sanitizer::default().sanitize(parse_markdown(MIXED));
    let once = transform_tree(sanitized);
    let twice = transform_tree(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn frontmatter_round_trip() {
    let text = "---\nid: 42\ntitle: Trapping Rain Water\ndiff: Hard\ntags:\n  - array\n  - two pointers\ndate: 2023-02-12\n---\n\nBody\n";
    let (parsed, body) = FrontMatter::parse(text).unwrap();
    assert_eq!(body, "Body\n");

    let block = parsed.to_block().unwrap();
    let (reparsed, rest) = FrontMatter::parse(&block).unwrap();
    assert_eq!(reparsed, parsed);
    assert_eq!(rest, "");
}

#[test]
fn malformed_frontmatter_is_an_error() {
    let err = ContentDocument::parse(
        "---\ntitle: open\nno closing fence\n",
        std::path::Path::new("content/leetcode/9.md"),
        DocumentKind::Solution,
    )
    .unwrap_err();
    assert!(matches!(err, folio_rs::Error::MalformedFrontmatter { .. }));
}

#[test]
fn backslash_before_accented_letter_renders() {
    let html = MarkdownPipeline::default().render_html("caf\\é is $x$ and \\中文 too\n");
    assert!(html.contains("caf\\é is "));
    assert!(html.contains(r#"<span class="math math-inline">\(x\)</span>"#));
    assert!(html.contains("\\中文 too"));
}

#[test]
fn control_characters_cannot_smuggle_a_scheme() {
    let pipeline = MarkdownPipeline::default();
    for body in [
        "<a href=\"java&#9;script:alert(1)\">click</a>\n",
        "<a href=\"&#1;javascript:alert(1)\">click</a>\n",
        "<a href=\"java&#10;script:alert(1)\">click</a>\n",
        "[click](java&#9;script:alert(1))\n",
        "![x](&#1;javascript:alert(1))\n",
    ] {
        let html = pipeline.render_html(body);
        assert!(!html.contains("script:"), "unsafe URL kept in {:?}", html);
        assert!(!html.contains("href="), "href kept in {:?}", html);
    }
}
