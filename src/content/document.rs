//! Content document model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::FrontMatter;
use crate::error::{Error, Result};

/// Routing key of a document: LeetCode problem numbers or free-form ids
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocId {
    Number(u64),
    Text(String),
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocId::Number(n) => write!(f, "{}", n),
            DocId::Text(s) => f.write_str(s),
        }
    }
}

/// Problem difficulty label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!(
                "unknown difficulty `{}`, expected Easy, Medium or Hard",
                other
            )),
        }
    }
}

impl TryFrom<String> for Difficulty {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Difficulty> for String {
    fn from(value: Difficulty) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which part of the site a document belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// A LeetCode solution write-up
    Solution,
    /// A standalone page (home, about, site notes, ...)
    Page,
}

/// One parsed content file. Immutable after loading.
#[derive(Debug, Clone)]
pub struct ContentDocument {
    pub frontmatter: FrontMatter,
    /// Raw Markdown body (front-matter removed)
    pub body: String,
    /// Full source file path
    pub source: PathBuf,
    /// File stem, used when no id is given
    pub slug: String,
    pub kind: DocumentKind,
}

/// A text id becomes exactly one directory under the section
fn check_route_segment(id: &str) -> Result<()> {
    let id = id.trim();
    if id.is_empty() || id == "." || id.contains(['/', '\\']) || id.contains("..") {
        return Err(Error::malformed(format!(
            "id {:?} cannot be used as a page path",
            id
        )));
    }
    Ok(())
}

impl ContentDocument {
    /// Parse a document from file text
    pub fn parse(text: &str, source: &Path, kind: DocumentKind) -> Result<Self> {
        let (frontmatter, body) = FrontMatter::parse(text).map_err(|e| e.with_path(source))?;
        if let Some(DocId::Text(id)) = &frontmatter.id {
            check_route_segment(id).map_err(|e| e.with_path(source))?;
        }

        let slug = source
            .file_stem()
            .and_then(|s| s.to_str())
            .map(String::from)
            .ok_or_else(|| Error::Config(format!("invalid file name: {:?}", source)))?;

        Ok(Self {
            frontmatter,
            body: body.to_string(),
            source: source.to_path_buf(),
            slug,
            kind,
        })
    }

    /// Routing key: the front-matter id, or the filename slug
    pub fn route_key(&self) -> String {
        self.frontmatter
            .id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| self.slug.clone())
    }

    /// Title from front-matter, falling back to the slug
    pub fn title(&self) -> &str {
        self.frontmatter.title.as_deref().unwrap_or(&self.slug)
    }

    /// URL path of the generated page, relative to the site root
    pub fn path(&self) -> String {
        match self.kind {
            DocumentKind::Solution => format!("leetcode/{}/", self.route_key()),
            DocumentKind::Page if self.slug == "index" => String::new(),
            DocumentKind::Page => format!("{}/", self.route_key()),
        }
    }

    /// Link to the problem statement on leetcode.com
    pub fn problem_link(&self) -> Option<String> {
        if self.kind != DocumentKind::Solution {
            return None;
        }
        self.frontmatter
            .title
            .as_deref()
            .map(|title| format!("https://leetcode.com/problems/{}/", slug::slugify(title)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parse_is_case_insensitive() {
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(" Medium ".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert!("trivial".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_solution_routes_by_id() {
        let text = "---\nid: 42\ntitle: Trapping Rain Water\n---\nBody";
        let doc =
            ContentDocument::parse(text, Path::new("leetcode/trap.md"), DocumentKind::Solution)
                .unwrap();
        assert_eq!(doc.route_key(), "42");
        assert_eq!(doc.path(), "leetcode/42/");
        assert_eq!(
            doc.problem_link().as_deref(),
            Some("https://leetcode.com/problems/trapping-rain-water/")
        );
    }

    #[test]
    fn test_text_id_must_be_one_segment() {
        for id_line in [r#"id: "a/b""#, "id: ..", r#"id: 'x\y'"#, "id: ../../x", r#"id: """#] {
            let text = format!("---\n{}\n---\n", id_line);
            let err = ContentDocument::parse(&text, Path::new("leetcode/x.md"), DocumentKind::Solution)
                .unwrap_err();
            assert!(matches!(err, Error::MalformedFrontmatter { .. }), "accepted {}", id_line);
        }

        let doc = ContentDocument::parse(
            "---\nid: two-sum\n---\n",
            Path::new("leetcode/x.md"),
            DocumentKind::Solution,
        )
        .unwrap();
        assert_eq!(doc.path(), "leetcode/two-sum/");
    }

    #[test]
    fn test_page_routes_by_slug() {
        let doc = ContentDocument::parse("Hello", Path::new("pages/about.md"), DocumentKind::Page)
            .unwrap();
        assert_eq!(doc.route_key(), "about");
        assert_eq!(doc.title(), "about");
        assert_eq!(doc.path(), "about/");
        assert_eq!(doc.problem_link(), None);

        let index = ContentDocument::parse("Hi", Path::new("pages/index.md"), DocumentKind::Page)
            .unwrap();
        assert_eq!(index.path(), "");
    }

    #[test]
    fn test_malformed_error_carries_path() {
        let err = ContentDocument::parse(
            "---\ntitle: x\n",
            Path::new("leetcode/1.md"),
            DocumentKind::Solution,
        )
        .unwrap_err();
        assert!(err.to_string().contains("leetcode/1.md"));
    }
}
