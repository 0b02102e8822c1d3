//! Markdown rendering pipeline
//!
//! body -> syntax tree -> sanitized tree -> transformed tree -> rendered nodes

mod ast;
mod highlight;
mod html;
mod math;
mod parser;
mod render;
mod sanitize;
mod transform;

pub use ast::SyntaxNode;
pub use highlight::{highlight_css, HighlighterRegistry, DARK_SCOPE};
pub use math::{split_math, MathSpan};
pub use parser::parse_markdown;
pub use render::{BlockRenderer, CodeView, RenderedNode, Typography};
pub use sanitize::{SanitizeConfig, Sanitizer};
pub use transform::{normalize_language, transform_tree};

use crate::config::SiteConfig;

/// The configured pipeline. Holds no per-document state, so one instance
/// renders any number of documents.
pub struct MarkdownPipeline {
    sanitizer: Sanitizer,
    highlighter: HighlighterRegistry,
    line_numbers: bool,
}

impl MarkdownPipeline {
    pub fn new(sanitizer: Sanitizer, highlighter: HighlighterRegistry, line_numbers: bool) -> Self {
        Self {
            sanitizer,
            highlighter,
            line_numbers,
        }
    }

    /// Build from the `sanitize` and `highlight` sections of the site config
    pub fn from_config(config: &SiteConfig) -> Self {
        let languages = if config.highlight.enable {
            config.highlight.languages.clone()
        } else {
            Vec::new()
        };
        Self::new(
            Sanitizer::new(config.sanitize.clone()),
            HighlighterRegistry::new(languages),
            config.highlight.line_number,
        )
    }

    pub fn highlighter(&self) -> &HighlighterRegistry {
        &self.highlighter
    }

    /// Parse, sanitize and transform a body
    pub fn syntax_tree(&self, body: &str) -> SyntaxNode {
        let tree = parse_markdown(body);
        let tree = self.sanitizer.sanitize(tree);
        transform_tree(tree)
    }

    /// Presentation nodes for a body
    pub fn render_tree(&self, body: &str) -> RenderedNode {
        let tree = self.syntax_tree(body);
        BlockRenderer::new(&self.highlighter, self.line_numbers).render(&tree)
    }

    /// HTML for a body
    pub fn render_html(&self, body: &str) -> String {
        self.render_tree(body).to_html()
    }
}

impl Default for MarkdownPipeline {
    fn default() -> Self {
        Self::new(Sanitizer::default(), HighlighterRegistry::default(), true)
    }
}
