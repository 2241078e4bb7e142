pub mod behavior;
pub mod config;
pub mod error;
pub mod factory;
pub mod finalize;
pub mod loader;
pub mod model;
pub mod naming;
pub mod platform;
pub mod serializer;
pub mod tree;
pub mod types;

use serde_json::Value;
use wasm_bindgen::prelude::*;

pub use config::GeneratorConfig;
pub use error::{ErrorKind, ModelError, Result};
pub use factory::ModelFactory;
pub use model::Schema;

/// Finalize `schema` for the platform and options of `config`.
pub fn finalize_with(schema: &mut Schema, config: &GeneratorConfig) -> Result<()> {
    if config.generator.heavy_indexing {
        for database in schema.databases_mut() {
            database.heavy_indexing = true;
        }
    }
    let platform = config.platform();
    finalize::finalize(schema, platform.as_ref())
}

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Build and finalize a JSON schema tree, returning the model dump
#[wasm_bindgen(js_name = "buildSchema")]
pub fn build_schema(source: &str, config: Option<String>) -> Result<String, JsValue> {
    build_and_dump(source, config.as_deref()).map_err(|e| js_sys::Error::new(&e.to_string()).into())
}

fn build_and_dump(source: &str, config: Option<&str>) -> Result<String> {
    let tree: Value = serde_json::from_str(source)?;
    let config = match config {
        Some(config) => GeneratorConfig::from_tree(&serde_json::from_str(config)?)?,
        None => GeneratorConfig::default(),
    };

    let mut schema = ModelFactory::default().build(&tree)?;
    finalize_with(&mut schema, &config)?;
    Ok(serializer::serialize(&schema))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOKSTORE: &str = r#"{
        "name": "bookstore",
        "tables": [
            { "name": "author",
              "columns": [{ "name": "id", "type": "INTEGER", "primaryKey": true, "autoIncrement": true }] },
            { "name": "book",
              "columns": [{ "name": "id", "type": "INTEGER", "primaryKey": true, "autoIncrement": true }],
              "foreignKeys": [{ "foreignTable": "author" }] }
        ]
    }"#;

    #[test]
    fn test_build_and_dump() {
        let dump = build_and_dump(BOOKSTORE, None).unwrap();
        assert!(dump.contains("column authorId INTEGER\n"));
        assert!(dump.contains("column id INTEGER pk autoIncrement notNull <- book.author\n"));
        assert!(dump.contains("referrers book.author\n"));
    }

    #[test]
    fn test_config_selects_platform() {
        let config = r#"{ "generator": { "platform": "mysql", "heavyIndexing": true } }"#;
        let dump = build_and_dump(BOOKSTORE, Some(config)).unwrap();
        assert!(dump.contains("index book_fi_authorId (authorId)"));
        assert!(dump.contains("heavyIndexing=true"));
    }

    #[test]
    fn test_invalid_source() {
        let err = build_and_dump("{ not json", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
