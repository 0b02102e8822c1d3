//! Generator module - composes and writes every page of the site

use anyhow::Result;
use chrono::Datelike;
use std::fs;
use std::path::Path;

use tera::Context;
use walkdir::WalkDir;

use crate::content::{ContentDocument, Corpus};
use crate::helpers::{display_date, full_url_for, url_for};
use crate::markdown::{highlight_css, MarkdownPipeline};
use crate::templates::{
    Breadcrumb, MenuItem, SiteData, SolutionData, TemplateRenderer, CLIENT_SCRIPT, MATHJAX_CDN,
};
use crate::theme::{stylesheet, ThemeHandle};
use crate::Folio;

/// Page slug whose body introduces the LeetCode listing
const LISTING_INTRO_SLUG: &str = "leetcode";

/// Static site generator using the built-in templates
pub struct Generator {
    folio: Folio,
    renderer: TemplateRenderer,
    pipeline: MarkdownPipeline,
    theme: ThemeHandle,
}

impl Generator {
    /// Create a generator; `theme` decides the initial mode of every page
    pub fn new(folio: &Folio, theme: ThemeHandle) -> Result<Self> {
        Ok(Self {
            folio: folio.clone(),
            renderer: TemplateRenderer::new()?,
            pipeline: MarkdownPipeline::from_config(&folio.config),
            theme,
        })
    }

    /// Generate the entire site, returning the number of pages written
    pub fn generate(&self, corpus: &Corpus) -> Result<usize> {
        fs::create_dir_all(&self.folio.public_dir)?;

        self.write_assets()?;
        self.copy_static_assets()?;

        let site = self.build_site_data();
        let mut count = 0;

        self.write_page("", &self.compose_home(corpus, &site)?)?;
        count += 1;

        for page in corpus.pages.iter().filter(|p| is_routed_page(p)) {
            self.write_page(&page.path(), &self.compose_page(page, &site)?)?;
            count += 1;
        }

        self.write_page("leetcode/", &self.compose_listing(corpus, &site)?)?;
        count += 1;

        for solution in &corpus.solutions {
            self.write_page(&solution.path(), &self.compose_solution(solution, &site)?)?;
            count += 1;
        }

        Ok(count)
    }

    /// Site data shared by every page
    pub fn build_site_data(&self) -> SiteData {
        let config = &self.folio.config;
        let year = chrono::Local::now().year();

        SiteData {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            copyright: config.copyright_line(year),
            home_url: url_for(config, "/"),
            menu: config
                .menu
                .iter()
                .map(|item| MenuItem {
                    label: item.label.clone(),
                    path: url_for(config, &item.path),
                })
                .collect(),
            stylesheet_url: url_for(config, "css/site.css"),
            highlight_url: url_for(config, "css/highlight.css"),
            script_url: url_for(config, "js/folio.js"),
            mathjax_cdn: MATHJAX_CDN.to_string(),
            theme_mode: self.theme.mode().as_str().to_string(),
            storage_key: config.theme.storage_key.clone(),
            copy_revert_ms: config.widgets.copy_revert_ms,
        }
    }

    fn create_base_context(&self, site: &SiteData, page_title: &str, path: &str) -> Context {
        let mut context = Context::new();
        context.insert("site", site);
        context.insert("page_title", page_title);
        context.insert("canonical_url", &full_url_for(&self.folio.config, path));
        context
    }

    /// The home page: `pages/index.md`, or links to the main sections
    pub fn compose_home(&self, corpus: &Corpus, site: &SiteData) -> Result<String> {
        if let Some(index) = corpus.pages.iter().find(|p| p.slug == "index") {
            return self.compose_page(index, site);
        }

        let config = &self.folio.config;
        let body = format!(
            "- [Site Notes]({})\n- [LeetCode]({})\n",
            url_for(config, "site-notes/"),
            url_for(config, "leetcode/")
        );
        let mut context = self.create_base_context(site, "", "");
        context.insert("content", &self.pipeline.render_html(&body));
        Ok(self.renderer.render("page.html", &context)?)
    }

    /// A standalone Markdown page
    pub fn compose_page(&self, page: &ContentDocument, site: &SiteData) -> Result<String> {
        let mut context = self.create_base_context(site, page.title(), &page.path());
        context.insert("content", &self.pipeline.render_html(&page.body));
        if let Some(date) = page.frontmatter.parse_date() {
            context.insert("last_edited", &display_date(&date));
        }
        Ok(self.renderer.render("page.html", &context)?)
    }

    /// The table of every solution, in id order
    pub fn compose_listing(&self, corpus: &Corpus, site: &SiteData) -> Result<String> {
        let problems: Vec<SolutionData> = corpus
            .solutions
            .iter()
            .map(|s| self.solution_data(s))
            .collect();

        let mut context = self.create_base_context(site, "LeetCode", "leetcode/");
        context.insert("problems", &problems);
        if let Some(intro) = corpus.pages.iter().find(|p| p.slug == LISTING_INTRO_SLUG) {
            context.insert("intro", &self.pipeline.render_html(&intro.body));
        }
        Ok(self.renderer.render("leetcode_index.html", &context)?)
    }

    /// One solution with breadcrumbs, metadata and the rendered write-up
    pub fn compose_solution(&self, solution: &ContentDocument, site: &SiteData) -> Result<String> {
        let config = &self.folio.config;
        let data = self.solution_data(solution);
        let breadcrumbs = vec![
            Breadcrumb {
                label: "Home".to_string(),
                path: Some(url_for(config, "/")),
            },
            Breadcrumb {
                label: "LeetCode".to_string(),
                path: Some(url_for(config, "leetcode/")),
            },
            Breadcrumb {
                label: data.id.clone(),
                path: None,
            },
        ];

        let mut context =
            self.create_base_context(site, &format!("{}. {}", data.id, data.title), &solution.path());
        context.insert("breadcrumbs", &breadcrumbs);
        context.insert("solution", &data);
        context.insert("content", &self.pipeline.render_html(&solution.body));
        Ok(self.renderer.render("solution.html", &context)?)
    }

    fn solution_data(&self, doc: &ContentDocument) -> SolutionData {
        SolutionData {
            id: doc.route_key(),
            title: doc.title().to_string(),
            difficulty: doc.frontmatter.difficulty.map(|d| d.as_str().to_string()),
            tags: doc.frontmatter.tags.clone(),
            path: url_for(&self.folio.config, &doc.path()),
            problem_link: doc.problem_link(),
            date: doc.frontmatter.parse_date().map(|d| display_date(&d)),
        }
    }

    fn write_page(&self, path: &str, html: &str) -> Result<()> {
        // Strip leading slash from path to avoid creating absolute paths
        let clean_path = path.trim_start_matches('/');
        let output_path = self.folio.public_dir.join(clean_path).join("index.html");
        write_file(&output_path, html)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// Stylesheets and the client script
    fn write_assets(&self) -> Result<()> {
        let public = &self.folio.public_dir;
        let highlight = &self.folio.config.highlight;

        write_file(&public.join("css").join("site.css"), &stylesheet())?;
        write_file(
            &public.join("css").join("highlight.css"),
            &highlight_css(&highlight.light_theme, &highlight.dark_theme)?,
        )?;
        write_file(&public.join("js").join("folio.js"), CLIENT_SCRIPT)?;
        Ok(())
    }

    /// Copy everything under `static/` as is
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.folio.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;

            // Skip files in directories starting with _ or .
            let hidden = relative.components().any(|c| {
                c.as_os_str()
                    .to_str()
                    .map(|s| s.starts_with('_') || s.starts_with('.'))
                    .unwrap_or(false)
            });
            if hidden {
                continue;
            }

            let dest = self.folio.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            tracing::debug!("Copied: {:?} -> {:?}", path, dest);
        }

        Ok(())
    }
}

/// Pages with their own route; the index and the listing intro are
/// rendered into other pages
fn is_routed_page(page: &ContentDocument) -> bool {
    page.slug != "index" && page.slug != LISTING_INTRO_SLUG
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::ContentLoader;
    use crate::theme::{ColorMode, MemoryPreferenceStore, ThemeMode};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, text: &str) {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    fn generator(dir: &TempDir, mode: ThemeMode) -> (Folio, Generator) {
        let folio = Folio::with_config(dir.path(), SiteConfig::default());
        let color = ColorMode::init(Arc::new(MemoryPreferenceStore::new()), "theme", mode);
        let generator = Generator::new(&folio, color.handle()).unwrap();
        (folio, generator)
    }

    #[test]
    fn test_generate_site() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "content/leetcode/42.md",
            "---\nid: 42\ntitle: Trapping Rain Water\ndiff: Hard\ntags: [array, stack]\n---\n\n```cpp\nint trap();\n```\n",
        );
        write(&dir, "content/pages/about.md", "# Hello, you are here...\n");
        write(&dir, "static/images/logo.svg", "<svg/>");
        write(&dir, "static/_drafts/skip.txt", "x");

        let (folio, generator) = generator(&dir, ThemeMode::Light);
        let corpus = ContentLoader::new(&folio).load().unwrap();
        let count = generator.generate(&corpus).unwrap();
        assert_eq!(count, 4);

        let public = dir.path().join("public");
        for page in ["index.html", "about/index.html", "leetcode/index.html", "leetcode/42/index.html"] {
            assert!(public.join(page).exists(), "missing {}", page);
        }
        assert!(public.join("css/site.css").exists());
        assert!(public.join("css/highlight.css").exists());
        assert!(public.join("js/folio.js").exists());
        assert!(public.join("images/logo.svg").exists());
        assert!(!public.join("_drafts/skip.txt").exists());

        let solution = fs::read_to_string(public.join("leetcode/42/index.html")).unwrap();
        assert!(solution.contains("42. Trapping Rain Water"));
        assert!(solution.contains("diff-badge diff-hard"));
        assert!(solution.contains("class=\"copy-button\" data-state=\"idle\""));
        assert!(solution.contains("https://leetcode.com/problems/trapping-rain-water/"));
    }

    #[test]
    fn test_listing_is_sorted_and_uses_intro() {
        let dir = TempDir::new().unwrap();
        write(&dir, "content/leetcode/b.md", "---\nid: 10\ntitle: Ten\n---\n");
        write(&dir, "content/leetcode/a.md", "---\nid: 2\ntitle: Two\ndiff: Easy\n---\n");
        write(&dir, "content/pages/leetcode.md", "My **solutions**.\n");

        let (folio, generator) = generator(&dir, ThemeMode::Light);
        let corpus = ContentLoader::new(&folio).load().unwrap();
        let html = generator
            .compose_listing(&corpus, &generator.build_site_data())
            .unwrap();

        let two = html.find("/leetcode/2/").unwrap();
        let ten = html.find("/leetcode/10/").unwrap();
        assert!(two < ten);
        assert!(html.contains("<strong>solutions</strong>"));
        assert!(html.contains("diff-badge diff-easy"));
        assert!(html.contains(r#"<link rel="canonical" href="http://example.com/leetcode/">"#));

        generator.generate(&corpus).unwrap();
        assert!(!dir.path().join("public/leetcode/leetcode").exists());
    }

    #[test]
    fn test_default_home_links_sections() {
        let dir = TempDir::new().unwrap();
        let (_, generator) = generator(&dir, ThemeMode::Light);
        let html = generator
            .compose_home(&Corpus::default(), &generator.build_site_data())
            .unwrap();
        assert!(html.contains(r#"<a href="/site-notes/">Site Notes</a>"#));
        assert!(html.contains(r#"<a href="/leetcode/">LeetCode</a>"#));
    }

    #[test]
    fn test_page_shows_last_edited_date() {
        let dir = TempDir::new().unwrap();
        write(&dir, "content/pages/delaunay.md", "---\ntitle: Delaunay\ndate: 2024-03-05\n---\nText\n");
        write(&dir, "content/pages/about.md", "Hi\n");

        let (folio, generator) = generator(&dir, ThemeMode::Light);
        let corpus = ContentLoader::new(&folio).load().unwrap();
        let site = generator.build_site_data();

        let dated = generator.compose_page(corpus.page("delaunay").unwrap(), &site).unwrap();
        assert!(dated.contains(r#"<p class="last-edited">Last edited: March 5, 2024</p>"#));

        let undated = generator.compose_page(corpus.page("about").unwrap(), &site).unwrap();
        assert!(!undated.contains("Last edited"));
    }

    #[test]
    fn test_initial_theme_follows_mode() {
        let dir = TempDir::new().unwrap();
        let (_, generator) = generator(&dir, ThemeMode::Dark);
        let site = generator.build_site_data();
        assert_eq!(site.theme_mode, "dark");
        let html = generator.compose_home(&Corpus::default(), &site).unwrap();
        assert!(html.contains(r#"data-theme="dark""#));
    }
}
