//! Create a new solution or page

use anyhow::{bail, Result};
use std::fs;
use std::path::PathBuf;

use crate::content::{Difficulty, DocId, FrontMatter};
use crate::Folio;

/// What to put in a new content file
#[derive(Debug, Clone, Default)]
pub struct NewDocument {
    pub title: String,
    /// `solution` or `page`
    pub layout: String,
    pub id: Option<String>,
    pub difficulty: Option<String>,
    pub tags: Vec<String>,
}

/// Write the scaffold of a new document and return its path
pub fn create(folio: &Folio, doc: &NewDocument) -> Result<PathBuf> {
    let now = chrono::Local::now();

    let mut frontmatter = FrontMatter {
        title: Some(doc.title.clone()),
        date: Some(now.format("%Y-%m-%d").to_string()),
        ..FrontMatter::default()
    };

    let (dir, stem, body) = match doc.layout.as_str() {
        "solution" => {
            let id = doc.id.as_deref().map(parse_id);
            if let Some(difficulty) = &doc.difficulty {
                let difficulty: Difficulty = difficulty.parse().map_err(anyhow::Error::msg)?;
                frontmatter.difficulty = Some(difficulty);
            }
            frontmatter.tags = doc.tags.clone();

            let stem = id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| slug::slugify(&doc.title));
            frontmatter.id = id;
            (folio.leetcode_dir.clone(), stem, "## Solution\n\n")
        }
        "page" => (folio.pages_dir.clone(), slug::slugify(&doc.title), ""),
        other => bail!("Unknown layout: {}. Available: solution, page", other),
    };

    let file_path = dir.join(format!("{}.md", stem));
    if file_path.exists() {
        bail!("File already exists: {:?}", file_path);
    }

    fs::create_dir_all(&dir)?;
    fs::write(&file_path, format!("{}\n{}", frontmatter.to_block()?, body))?;

    tracing::info!("Created: {:?}", file_path);
    Ok(file_path)
}

/// Problem numbers stay numeric so the listing sorts them numerically
fn parse_id(id: &str) -> DocId {
    id.trim()
        .parse::<u64>()
        .map(DocId::Number)
        .unwrap_or_else(|_| DocId::Text(id.trim().to_string()))
}
