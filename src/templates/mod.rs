//! Page templates, embedded in the binary and rendered with Tera

use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::error::Result;

/// Client script for the copy buttons and the theme toggle
pub const CLIENT_SCRIPT: &str = include_str!("site/folio.js");

/// Default MathJax bundle
pub const MATHJAX_CDN: &str = "https://cdn.jsdelivr.net/npm/mathjax@4/tex-mml-chtml.js";

/// Template renderer with the built-in site layout
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Page bodies arrive as finished HTML; text fields use `| escape`
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("page.html", include_str!("site/page.html")),
            ("leetcode_index.html", include_str!("site/leetcode_index.html")),
            ("solution.html", include_str!("site/solution.html")),
            ("partials/head.html", include_str!("site/partials/head.html")),
            (
                "partials/header.html",
                include_str!("site/partials/header.html"),
            ),
            (
                "partials/footer.html",
                include_str!("site/partials/footer.html"),
            ),
            (
                "partials/scripts.html",
                include_str!("site/partials/scripts.html"),
            ),
        ])?;

        tera.register_filter("difficulty_class", difficulty_class_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: CSS class of a difficulty badge
fn difficulty_class_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("difficulty_class", "value", String, value);
    Ok(tera::Value::String(format!(
        "diff-{}",
        s.trim().to_ascii_lowercase()
    )))
}

// Template context data

/// Site-wide values shared by every page
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub copyright: String,
    pub home_url: String,
    pub menu: Vec<MenuItem>,
    pub stylesheet_url: String,
    pub highlight_url: String,
    pub script_url: String,
    pub mathjax_cdn: String,
    /// Initial `data-theme` of the page
    pub theme_mode: String,
    pub storage_key: String,
    pub copy_revert_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    pub label: String,
    pub path: String,
}

/// One row of the LeetCode listing, and the header of a solution page
#[derive(Debug, Clone, Serialize)]
pub struct SolutionData {
    pub id: String,
    pub title: String,
    pub difficulty: Option<String>,
    pub tags: Vec<String>,
    pub path: String,
    pub problem_link: Option<String>,
    pub date: Option<String>,
}

/// A breadcrumb; the last one has no link
#[derive(Debug, Clone, Serialize)]
pub struct Breadcrumb {
    pub label: String,
    pub path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteData {
        SiteData {
            title: "Notes & Logs".to_string(),
            description: String::new(),
            author: "Ann".to_string(),
            language: "en".to_string(),
            copyright: "© 2024 Ann".to_string(),
            home_url: "/".to_string(),
            menu: vec![MenuItem {
                label: "About".to_string(),
                path: "/about/".to_string(),
            }],
            stylesheet_url: "/css/site.css".to_string(),
            highlight_url: "/css/highlight.css".to_string(),
            script_url: "/js/folio.js".to_string(),
            mathjax_cdn: MATHJAX_CDN.to_string(),
            theme_mode: "dark".to_string(),
            storage_key: "theme".to_string(),
            copy_revert_ms: 1000,
        }
    }

    #[test]
    fn test_page_layout() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert("page_title", "About");
        context.insert("content", "<p>Hi</p>");

        let html = renderer.render("page.html", &context).unwrap();
        assert!(html.contains(r#"<html lang="en" data-theme="dark">"#));
        assert!(html.contains("<title>About | Notes &amp; Logs</title>"));
        assert!(html.contains(r#"<a href="/about/">About</a>"#));
        assert!(html.contains("class=\"theme-toggle\""));
        assert!(html.contains("<p>Hi</p>"));
        assert!(html.contains("© 2024 Ann"));
        assert!(html.contains(r#"data-copy-revert-ms="1000""#));
        assert!(html.contains("processEscapes: true"));
    }

    #[test]
    fn test_solution_header() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert("page_title", "42. Trapping Rain Water");
        context.insert(
            "breadcrumbs",
            &vec![
                Breadcrumb {
                    label: "Home".to_string(),
                    path: Some("/".to_string()),
                },
                Breadcrumb {
                    label: "LeetCode".to_string(),
                    path: Some("/leetcode/".to_string()),
                },
                Breadcrumb {
                    label: "42".to_string(),
                    path: None,
                },
            ],
        );
        context.insert(
            "solution",
            &SolutionData {
                id: "42".to_string(),
                title: "Trapping Rain Water".to_string(),
                difficulty: Some("Hard".to_string()),
                tags: vec!["array".to_string(), "stack".to_string()],
                path: "/leetcode/42/".to_string(),
                problem_link: Some(
                    "https://leetcode.com/problems/trapping-rain-water/".to_string(),
                ),
                date: None,
            },
        );
        context.insert("content", "");

        let html = renderer.render("solution.html", &context).unwrap();
        assert!(html.contains(r#"<a href="/">Home</a> / <a href="/leetcode/">LeetCode</a> / <span>42</span>"#));
        assert!(html.contains("42. Trapping Rain Water</h4>"));
        assert!(html.contains(r#"<span class="diff-badge diff-hard">Hard</span>"#));
        assert!(html.contains("array, stack"));
        assert!(html.contains("https://leetcode.com/problems/trapping-rain-water/"));
    }

    #[test]
    fn test_difficulty_class_filter() {
        let value = difficulty_class_filter(&tera::Value::from("Medium"), &HashMap::new()).unwrap();
        assert_eq!(value, tera::Value::from("diff-medium"));
    }
}
