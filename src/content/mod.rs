//! Content module - handles content documents and front-matter

mod document;
mod frontmatter;
pub mod loader;

pub use document::{ContentDocument, Difficulty, DocId, DocumentKind};
pub use frontmatter::FrontMatter;
pub use loader::{ContentLoader, Corpus};
