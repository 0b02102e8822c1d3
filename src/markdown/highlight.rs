//! Syntax highlighting backed by syntect
//!
//! Code is highlighted into class-based spans so one stylesheet per theme can
//! follow the client-side light/dark toggle.

use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::error::{Error, Result};

/// Prefix of every highlighting class
pub const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

/// Selector that scopes the dark stylesheet
pub const DARK_SCOPE: &str = "[data-theme=\"dark\"]";

/// Grammars selected by exact language tag
pub struct HighlighterRegistry {
    syntax_set: SyntaxSet,
    languages: Vec<String>,
}

impl HighlighterRegistry {
    /// Register the given language tags. A tag with no grammar in the
    /// bundled syntax set is ignored.
    pub fn new<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let languages = languages
            .into_iter()
            .map(Into::into)
            .filter(|lang: &String| {
                let known = syntax_set.find_syntax_by_token(lang).is_some();
                if !known {
                    tracing::warn!("No grammar for language '{}', it will render as plain text", lang);
                }
                known
            })
            .collect();

        Self {
            syntax_set,
            languages,
        }
    }

    /// Registered tags
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Case-sensitive check against the registered tags
    pub fn is_registered(&self, language: &str) -> bool {
        self.languages.iter().any(|l| l == language)
    }

    /// Highlight `code` as `language`, returning class-annotated HTML.
    ///
    /// `None` means plain rendering: the tag is not registered or the grammar
    /// failed on this input.
    pub fn highlight(&self, code: &str, language: &str) -> Option<String> {
        if !self.is_registered(language) {
            tracing::debug!("Language '{}' not registered, skipping highlighting", language);
            return None;
        }
        let syntax = self.syntax_set.find_syntax_by_token(language)?;

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
                tracing::debug!("Highlighting '{}' failed: {}", language, e);
                return None;
            }
        }
        Some(generator.finalize())
    }
}

impl Default for HighlighterRegistry {
    fn default() -> Self {
        Self::new(["cpp", "python"])
    }
}

/// Stylesheet for both color themes. Dark rules only apply under
/// `[data-theme="dark"]`.
pub fn highlight_css(light_theme: &str, dark_theme: &str) -> Result<String> {
    let themes = ThemeSet::load_defaults();
    let css_for = |name: &str| {
        let theme = themes
            .themes
            .get(name)
            .ok_or_else(|| Error::Config(format!("Unknown highlight theme: {}", name)))?;
        css_for_theme_with_class_style(theme, CLASS_STYLE)
            .map_err(|e| Error::Config(format!("Cannot build CSS for {}: {}", name, e)))
    };

    let light = css_for(light_theme)?;
    let dark = scope_selectors(&css_for(dark_theme)?, DARK_SCOPE);
    Ok(format!("{}\n{}", light, dark))
}

/// Prefix every selector of a flat stylesheet with `scope`
fn scope_selectors(css: &str, scope: &str) -> String {
    let mut out = String::with_capacity(css.len() * 2);
    for line in css.lines() {
        match line.strip_suffix('{') {
            Some(selectors) if !line.trim_start().starts_with(['/', '*']) => {
                let scoped: Vec<String> = selectors
                    .split(',')
                    .map(|s| format!("{} {}", scope, s.trim()))
                    .collect();
                out.push_str(&scoped.join(", "));
                out.push_str(" {");
            }
            _ => out.push_str(line),
        }
        out.push('\n');
    }
    out
}
