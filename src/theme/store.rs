//! Persisted preferences

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};

/// Named slots holding JSON values
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// Preferences in a JSON object file, e.g. `.folio/preferences.json`
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid preference file {:?}: {}", self.path, e)))
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut all = self.read_all()?;
        all.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&all)
            .map_err(|e| Error::Config(format!("Cannot encode preferences: {}", e)))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Preferences that live as long as the process
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<Map<String, Value>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let values = self.values.lock().unwrap_or_else(|p| p.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(|p| p.into_inner());
        values.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".folio").join("preferences.json");
        let store = FilePreferenceStore::new(&path);

        assert_eq!(store.get("theme").unwrap(), None);
        store.set("theme", json!(true)).unwrap();
        store.set("other", json!("x")).unwrap();

        let reopened = FilePreferenceStore::new(&path);
        assert_eq!(reopened.get("theme").unwrap(), Some(json!(true)));
        assert_eq!(reopened.get("other").unwrap(), Some(json!("x")));
    }

    #[test]
    fn test_file_store_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{not json").unwrap();
        let store = FilePreferenceStore::new(&path);
        assert!(matches!(store.get("theme"), Err(Error::Config(_))));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryPreferenceStore::new();
        store.set("theme", json!(false)).unwrap();
        assert_eq!(store.get("theme").unwrap(), Some(json!(false)));
        assert_eq!(store.get("missing").unwrap(), None);
    }
}
