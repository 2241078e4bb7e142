//! Sources of schema trees for external includes.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{ModelError, Result};

/// Produces the configuration tree stored at `path`.
pub trait SchemaLoader {
    fn load(&self, path: &Path) -> Result<Value>;
}

/// Reads JSON schema files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileLoader;

impl SchemaLoader for JsonFileLoader {
    fn load(&self, path: &Path) -> Result<Value> {
        let source = fs::read_to_string(path).map_err(|e| ModelError::load(path, e))?;
        serde_json::from_str(&source).map_err(|e| ModelError::load(path, e))
    }
}

/// Trees kept in memory, keyed by path. Used where there is no file system.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    trees: BTreeMap<PathBuf, Value>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, tree: Value) {
        self.trees.insert(path.into(), tree);
    }

    pub fn with(mut self, path: impl Into<PathBuf>, tree: Value) -> Self {
        self.insert(path, tree);
        self
    }
}

impl SchemaLoader for MemoryLoader {
    fn load(&self, path: &Path) -> Result<Value> {
        self.trees
            .get(path)
            .cloned()
            .ok_or_else(|| ModelError::load(path, "no such schema"))
    }
}

/// Resolve `filename` against the directory of the including schema.
pub fn resolve_include(location: Option<&Path>, filename: &str) -> Result<PathBuf> {
    let path = Path::new(filename);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let Some(location) = location else {
        return Err(ModelError::load(
            path,
            "relative include in a schema that has no location",
        ));
    };
    let base = location.parent().unwrap_or_else(|| Path::new(""));
    Ok(base.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_resolve_relative_to_including_file() {
        let path = resolve_include(Some(Path::new("schemas/main.json")), "shared/author.json").unwrap();
        assert_eq!(path, PathBuf::from("schemas/shared/author.json"));
    }

    #[test]
    fn test_resolve_absolute() {
        let absolute = std::env::temp_dir().join("author.json");
        let path = resolve_include(None, absolute.to_str().unwrap()).unwrap();
        assert_eq!(path, absolute);
    }

    #[test]
    fn test_relative_without_location() {
        let err = resolve_include(None, "author.json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaLoad);
    }

    #[test]
    fn test_json_file_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("author.json");
        fs::write(&path, r#"{ "name": "bookstore", "tables": [] }"#).unwrap();

        let tree = JsonFileLoader.load(&path).unwrap();
        assert_eq!(tree["name"], json!("bookstore"));

        let err = JsonFileLoader.load(&dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaLoad);
    }

    #[test]
    fn test_invalid_json_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ name").unwrap();
        let err = JsonFileLoader.load(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaLoad);
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_memory_loader() {
        let loader = MemoryLoader::new().with("a.json", json!({ "name": "a" }));
        assert!(loader.load(Path::new("a.json")).is_ok());
        assert!(loader.load(Path::new("b.json")).is_err());
    }
}
