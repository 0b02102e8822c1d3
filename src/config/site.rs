//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::markdown::SanitizeConfig;
use crate::theme::ThemeMode;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    /// Footer line; `{year}` and `{author}` are filled in
    pub copyright: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,
    pub leetcode_dir: String,
    pub pages_dir: String,

    /// Fail the build on a malformed front-matter block instead of skipping
    /// the document
    pub strict: bool,

    // Rendering
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub sanitize: SanitizeConfig,
    #[serde(default)]
    pub widgets: WidgetsConfig,
    #[serde(default)]
    pub theme: ThemeConfig,

    /// Header links
    pub menu: Vec<MenuItem>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            description: String::new(),
            author: "Anonymous".to_string(),
            language: "en".to_string(),
            copyright: "© {year} {author}".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            content_dir: "content".to_string(),
            public_dir: "public".to_string(),
            leetcode_dir: "leetcode".to_string(),
            pages_dir: "pages".to_string(),

            strict: true,

            highlight: HighlightConfig::default(),
            sanitize: SanitizeConfig::default(),
            widgets: WidgetsConfig::default(),
            theme: ThemeConfig::default(),

            menu: vec![MenuItem {
                label: "About".to_string(),
                path: "/about/".to_string(),
            }],
        }
    }
}

impl SiteConfig {
    /// Read `_config.yml`; missing keys keep their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("Invalid YAML in {}", path.display()))
    }

    /// Footer text with placeholders filled in
    pub fn copyright_line(&self, year: i32) -> String {
        self.copyright
            .replace("{year}", &year.to_string())
            .replace("{author}", &self.author)
    }
}

/// A header navigation link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub label: String,
    pub path: String,
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub line_number: bool,
    /// Language tags with a registered grammar, matched case-sensitively
    pub languages: Vec<String>,
    pub light_theme: String,
    pub dark_theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            line_number: true,
            languages: vec!["cpp".to_string(), "python".to_string()],
            light_theme: "InspiredGitHub".to_string(),
            dark_theme: "base16-ocean.dark".to_string(),
        }
    }
}

/// Widget behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetsConfig {
    /// Milliseconds before a copy button returns from "Copied!" to "Copy"
    pub copy_revert_ms: u64,
}

impl Default for WidgetsConfig {
    fn default() -> Self {
        Self {
            copy_revert_ms: 1000,
        }
    }
}

/// Light/dark mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Mode used when no preference has been stored
    pub default_mode: ThemeMode,
    /// Preference slot, shared with the browser's localStorage
    pub storage_key: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            default_mode: ThemeMode::Light,
            storage_key: "theme".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Folio");
        assert!(config.strict);
        assert_eq!(config.highlight.languages, vec!["cpp", "python"]);
        assert_eq!(config.widgets.copy_revert_ms, 1000);
        assert_eq!(config.theme.storage_key, "theme");
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Notes
author: Test User
strict: false
highlight:
  languages: [cpp, python, rust]
  line_number: false
theme:
  default_mode: dark
widgets:
  copy_revert_ms: 1500
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Notes");
        assert_eq!(config.author, "Test User");
        assert!(!config.strict);
        assert_eq!(config.highlight.languages, vec!["cpp", "python", "rust"]);
        assert!(!config.highlight.line_number);
        assert_eq!(config.highlight.light_theme, "InspiredGitHub");
        assert_eq!(config.theme.default_mode, ThemeMode::Dark);
        assert_eq!(config.widgets.copy_revert_ms, 1500);
        assert_eq!(config.public_dir, "public");
    }

    #[test]
    fn test_sanitize_override() {
        let yaml = r#"
sanitize:
  tags: [p, a]
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.sanitize.tags.len(), 2);
        assert!(config.sanitize.clean_content_tags.contains("script"));
    }

    #[test]
    fn test_copyright_line() {
        let config = SiteConfig {
            author: "Ann".to_string(),
            ..SiteConfig::default()
        };
        assert_eq!(config.copyright_line(2024), "© 2024 Ann");
    }
}
