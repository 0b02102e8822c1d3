//! Error types for the content pipeline

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop a document (or the whole build) from being produced.
///
/// Rendering problems are never reported here: unknown language tags,
/// disallowed markup and clipboard failures all degrade silently.
#[derive(Error, Debug)]
pub enum Error {
    /// The metadata block was opened but never closed, or its content is
    /// not a valid mapping.
    #[error("Malformed front-matter{}: {reason}", source_suffix(.source_path))]
    MalformedFrontmatter {
        reason: String,
        source_path: Option<PathBuf>,
    },

    /// Two documents share the same routing key.
    #[error("Duplicate document id {id:?} in {first:?} and {second:?}")]
    DuplicateId {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// I/O error when reading content or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Template rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// Configuration or preference file could not be read.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a malformed front-matter error without a file path.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedFrontmatter {
            reason: reason.into(),
            source_path: None,
        }
    }

    /// Attach the offending file to a front-matter error.
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Error::MalformedFrontmatter { reason, .. } => Error::MalformedFrontmatter {
                reason,
                source_path: Some(path.into()),
            },
            other => other,
        }
    }
}

fn source_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" in {}", p.display()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_includes_path() {
        let err = Error::malformed("block never closed").with_path("posts/1.md");
        let msg = err.to_string();
        assert!(msg.contains("block never closed"));
        assert!(msg.contains("posts/1.md"));
    }

    #[test]
    fn test_malformed_message_without_path() {
        let err = Error::malformed("not a mapping");
        assert_eq!(err.to_string(), "Malformed front-matter: not a mapping");
    }
}
