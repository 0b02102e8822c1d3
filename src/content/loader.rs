//! Content loader - loads solutions and pages from the content directory

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{ContentDocument, DocumentKind};
use crate::error::{Error, Result};
use crate::Folio;

/// Every document of the site, loaded once before rendering
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    /// LeetCode solutions, sorted by id
    pub solutions: Vec<ContentDocument>,
    pub pages: Vec<ContentDocument>,
}

impl Corpus {
    /// Look up a solution by its routing key
    pub fn solution(&self, key: &str) -> Option<&ContentDocument> {
        self.solutions.iter().find(|d| d.route_key() == key)
    }

    /// Look up a page by its routing key
    pub fn page(&self, key: &str) -> Option<&ContentDocument> {
        self.pages.iter().find(|d| d.route_key() == key)
    }

    /// All tags used by solutions, with counts, most used first
    pub fn tag_counts(&self) -> Vec<(String, usize)> {
        let mut tags: HashMap<&str, usize> = HashMap::new();
        for doc in &self.solutions {
            for tag in &doc.frontmatter.tags {
                *tags.entry(tag.as_str()).or_insert(0) += 1;
            }
        }
        let mut tags: Vec<_> = tags.into_iter().map(|(t, c)| (t.to_string(), c)).collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        tags
    }
}

/// Loads content from the content directory
pub struct ContentLoader<'a> {
    folio: &'a Folio,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(folio: &'a Folio) -> Self {
        Self { folio }
    }

    /// Load solutions and pages and check that routing keys are unique
    pub fn load(&self) -> Result<Corpus> {
        let mut solutions = self.load_dir(&self.folio.leetcode_dir, DocumentKind::Solution)?;
        let pages = self.load_dir(&self.folio.pages_dir, DocumentKind::Page)?;

        check_unique_ids(&solutions)?;
        check_unique_ids(&pages)?;

        solutions.sort_by(|a, b| compare_ids(a, b));

        Ok(Corpus { solutions, pages })
    }

    fn load_dir(&self, dir: &Path, kind: DocumentKind) -> Result<Vec<ContentDocument>> {
        if !dir.exists() {
            tracing::debug!("Content directory {:?} does not exist, skipping", dir);
            return Ok(Vec::new());
        }

        let mut docs = Vec::new();

        for entry in WalkDir::new(dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }

            let text = fs::read_to_string(path)?;
            match ContentDocument::parse(&text, path, kind) {
                Ok(doc) => docs.push(doc),
                Err(e @ Error::MalformedFrontmatter { .. }) if !self.folio.config.strict => {
                    tracing::warn!("Excluding {:?}: {}", path, e);
                }
                Err(e) => return Err(e),
            }
        }

        tracing::debug!("Loaded {} documents from {:?}", docs.len(), dir);
        Ok(docs)
    }
}

fn check_unique_ids(docs: &[ContentDocument]) -> Result<()> {
    let mut seen: HashMap<String, &PathBuf> = HashMap::new();
    for doc in docs {
        let key = doc.route_key();
        if let Some(first) = seen.get(&key) {
            return Err(Error::DuplicateId {
                id: key,
                first: (*first).clone(),
                second: doc.source.clone(),
            });
        }
        seen.insert(key, &doc.source);
    }
    Ok(())
}

/// Numeric ids sort numerically and before text ids
fn compare_ids(a: &ContentDocument, b: &ContentDocument) -> std::cmp::Ordering {
    use super::DocId;
    match (&a.frontmatter.id, &b.frontmatter.id) {
        (Some(DocId::Number(x)), Some(DocId::Number(y))) => x.cmp(y),
        (Some(DocId::Number(_)), _) => std::cmp::Ordering::Less,
        (_, Some(DocId::Number(_))) => std::cmp::Ordering::Greater,
        _ => a.route_key().cmp(&b.route_key()),
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    fn folio_in(dir: &TempDir, strict: bool) -> Folio {
        let config = SiteConfig {
            strict,
            ..SiteConfig::default()
        };
        Folio::with_config(dir.path(), config)
    }

    fn write(dir: &TempDir, rel: &str, text: &str) {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    #[test]
    fn test_load_sorts_solutions_by_numeric_id() {
        let dir = TempDir::new().unwrap();
        write(&dir, "content/leetcode/b.md", "---\nid: 10\ntitle: B\n---\n");
        write(&dir, "content/leetcode/a.md", "---\nid: 9\ntitle: A\n---\n");
        write(&dir, "content/pages/about.md", "Hello");
        write(&dir, "content/pages/notes.txt", "ignored");

        let folio = folio_in(&dir, true);
        let corpus = ContentLoader::new(&folio).load().unwrap();
        let ids: Vec<_> = corpus.solutions.iter().map(|d| d.route_key()).collect();
        assert_eq!(ids, vec!["9", "10"]);
        assert_eq!(corpus.pages.len(), 1);
        assert!(corpus.page("about").is_some());
        assert!(corpus.solution("10").is_some());
    }

    #[test]
    fn test_duplicate_ids_fail() {
        let dir = TempDir::new().unwrap();
        write(&dir, "content/leetcode/a.md", "---\nid: 1\n---\n");
        write(&dir, "content/leetcode/b.md", "---\nid: 1\n---\n");

        let folio = folio_in(&dir, true);
        let err = ContentLoader::new(&folio).load().unwrap_err();
        assert!(matches!(err, Error::DuplicateId { ref id, .. } if id == "1"));
    }

    #[test]
    fn test_malformed_fails_when_strict() {
        let dir = TempDir::new().unwrap();
        write(&dir, "content/leetcode/bad.md", "---\nid: 1\n");

        let folio = folio_in(&dir, true);
        assert!(matches!(
            ContentLoader::new(&folio).load(),
            Err(Error::MalformedFrontmatter { .. })
        ));
    }

    #[test]
    fn test_malformed_excluded_when_lenient() {
        let dir = TempDir::new().unwrap();
        write(&dir, "content/leetcode/bad.md", "---\nid: 1\n");
        write(&dir, "content/leetcode/good.md", "---\nid: 2\n---\n");

        let folio = folio_in(&dir, false);
        let corpus = ContentLoader::new(&folio).load().unwrap();
        assert_eq!(corpus.solutions.len(), 1);
        assert_eq!(corpus.solutions[0].route_key(), "2");
    }

    #[test]
    fn test_path_like_ids_rejected() {
        let dir = TempDir::new().unwrap();
        write(&dir, "content/leetcode/escape.md", "---\nid: \"../../x\"\n---\n");

        let folio = folio_in(&dir, true);
        let err = ContentLoader::new(&folio).load().unwrap_err();
        let expected = dir.path().join("content/leetcode/escape.md");
        assert!(matches!(
            err,
            Error::MalformedFrontmatter { source_path: Some(ref p), .. } if *p == expected
        ));

        let lenient = folio_in(&dir, false);
        assert!(ContentLoader::new(&lenient).load().unwrap().solutions.is_empty());
    }

    #[test]
    fn test_tag_counts() {
        let dir = TempDir::new().unwrap();
        write(&dir, "content/leetcode/a.md", "---\nid: 1\ntags: [dp, array]\n---\n");
        write(&dir, "content/leetcode/b.md", "---\nid: 2\ntags: [dp]\n---\n");

        let folio = folio_in(&dir, true);
        let corpus = ContentLoader::new(&folio).load().unwrap();
        assert_eq!(
            corpus.tag_counts(),
            vec![("dp".to_string(), 2), ("array".to_string(), 1)]
        );
    }
}
