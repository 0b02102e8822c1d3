//! folio-rs: a static site generator for Markdown notes and LeetCode
//! solution write-ups
//!
//! Every content file goes through the same pipeline: front-matter is split
//! off, the body is parsed into a syntax tree, sanitized, scanned for math
//! and code, rendered into presentation nodes and finally composed into a
//! page with the shared layout.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod markdown;
pub mod server;
pub mod templates;
pub mod theme;
pub mod widgets;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use error::Error;
pub use markdown::MarkdownPipeline;

/// Where persisted preferences live, relative to the site directory
pub const PREFERENCES_FILE: &str = ".folio/preferences.json";

/// The main Folio application
#[derive(Debug, Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content directory
    pub content_dir: PathBuf,
    /// LeetCode solutions
    pub leetcode_dir: PathBuf,
    /// Standalone pages
    pub pages_dir: PathBuf,
    /// Files copied to the output as is
    pub static_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Persisted preferences such as the theme mode
    pub preferences_path: PathBuf,
    color: theme::ColorMode,
}

impl Folio {
    /// Create a new Folio instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a Folio instance with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);
        let leetcode_dir = content_dir.join(&config.leetcode_dir);
        let pages_dir = content_dir.join(&config.pages_dir);
        let static_dir = base_dir.join("static");
        let public_dir = base_dir.join(&config.public_dir);
        let preferences_path = base_dir.join(PREFERENCES_FILE);
        let color = theme::ColorMode::init(
            Arc::new(theme::FilePreferenceStore::new(&preferences_path)),
            config.theme.storage_key.clone(),
            config.theme.default_mode,
        );

        Self {
            config,
            base_dir,
            content_dir,
            leetcode_dir,
            pages_dir,
            static_dir,
            public_dir,
            preferences_path,
            color,
        }
    }

    /// The site's color mode, read from the preference file when this
    /// instance was created and shared by all of its clones
    pub fn color_mode(&self) -> &theme::ColorMode {
        &self.color
    }

    /// Load every solution and page
    pub fn load_corpus(&self) -> error::Result<content::Corpus> {
        content::ContentLoader::new(self).load()
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directories_follow_config() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("_config.yml"),
            "title: Notes\ncontent_dir: src\npublic_dir: out\n",
        )
        .unwrap();

        let folio = Folio::new(dir.path()).unwrap();
        assert_eq!(folio.config.title, "Notes");
        assert_eq!(folio.leetcode_dir, dir.path().join("src").join("leetcode"));
        assert_eq!(folio.pages_dir, dir.path().join("src").join("pages"));
        assert_eq!(folio.public_dir, dir.path().join("out"));
    }

    #[test]
    fn test_color_mode_is_persisted() {
        let dir = TempDir::new().unwrap();
        let folio = Folio::with_config(dir.path(), config::SiteConfig::default());
        assert_eq!(folio.color_mode().mode(), theme::ThemeMode::Light);

        let handle = folio.color_mode().handle();
        folio.clone().color_mode().toggle().unwrap();
        assert_eq!(handle.mode(), theme::ThemeMode::Dark);
        assert_eq!(folio.color_mode().mode(), theme::ThemeMode::Dark);
        assert!(folio.preferences_path.exists());

        let reopened = Folio::with_config(dir.path(), config::SiteConfig::default());
        assert_eq!(reopened.color_mode().mode(), theme::ThemeMode::Dark);
    }
}
