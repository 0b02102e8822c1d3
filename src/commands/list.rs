//! List site content

use anyhow::Result;

use crate::Folio;

/// List site content by type
pub fn run(folio: &Folio, content_type: &str) -> Result<()> {
    let corpus = folio.load_corpus()?;

    match content_type {
        "solution" | "solutions" => {
            println!("Solutions ({}):", corpus.solutions.len());
            for doc in &corpus.solutions {
                let difficulty = doc
                    .frontmatter
                    .difficulty
                    .map(|d| d.as_str())
                    .unwrap_or("-");
                println!(
                    "  {:>5}  {:<8} {} [{}]",
                    doc.route_key(),
                    difficulty,
                    doc.title(),
                    doc.source.display()
                );
            }
        }
        "page" | "pages" => {
            println!("Pages ({}):", corpus.pages.len());
            for doc in &corpus.pages {
                println!("  /{} {} [{}]", doc.path(), doc.title(), doc.source.display());
            }
        }
        "tag" | "tags" => {
            let tags = corpus.tag_counts();
            println!("Tags ({}):", tags.len());
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: solution, page, tag",
                content_type
            );
        }
    }

    Ok(())
}
