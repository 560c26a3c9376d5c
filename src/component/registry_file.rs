//! Consolidated component registry document (`components/registry.json`).
//!
//! ```json
//! {
//!   "components": [
//!     { "name": "nginx", "version": "", "description": "", "installed": true }
//!   ]
//! }
//! ```
//!
//! Reading never fails: a missing file is an empty store, and entries that
//! do not deserialize are skipped with a warning.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RegistryError;
use crate::model::component::ComponentRecord;
use crate::store::{self, RecordStore};

#[derive(Serialize)]
struct ComponentDocument<'a> {
    components: Vec<&'a ComponentRecord>,
}

/// Render the store as pretty JSON. Output depends only on the records.
pub fn render(store: &RecordStore<ComponentRecord>) -> Result<String, RegistryError> {
    let document = ComponentDocument {
        components: store.all().collect(),
    };
    let mut text = serde_json::to_string_pretty(&document)?;
    text.push('\n');
    Ok(text)
}

pub fn write(path: &Path, store: &RecordStore<ComponentRecord>) -> Result<(), RegistryError> {
    let text = render(store)?;
    store::write_atomic(path, &text)?;
    tracing::debug!(
        "wrote {} component record(s) to {}",
        store.len(),
        path.display()
    );
    Ok(())
}

pub fn read(path: &Path) -> RecordStore<ComponentRecord> {
    match fs::read_to_string(path) {
        Ok(text) => parse(&text),
        Err(err) if err.kind() == ErrorKind::NotFound => RecordStore::new(),
        Err(err) => {
            tracing::warn!("failed to read {}: {err}", path.display());
            RecordStore::new()
        }
    }
}

/// Best-effort parse: keeps every well-formed entry.
pub fn parse(text: &str) -> RecordStore<ComponentRecord> {
    let mut store = RecordStore::new();

    let document: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!("component registry is not valid JSON: {err}");
            return store;
        }
    };

    let Some(entries) = document.get("components").and_then(Value::as_array) else {
        tracing::warn!("component registry has no `components` array");
        return store;
    };

    for (index, entry) in entries.iter().enumerate() {
        match ComponentRecord::deserialize(entry) {
            Ok(record) if !record.name.is_empty() => {
                store.put(record);
            }
            Ok(_) => tracing::warn!("skipping component entry {index}: empty name"),
            Err(err) => tracing::warn!("skipping component entry {index}: {err}"),
        }
    }

    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_store() -> RecordStore<ComponentRecord> {
        let mut nginx = ComponentRecord::installed("nginx");
        nginx.version = "1.24".to_string();
        nginx.description = "High-performance web server".to_string();

        let php = ComponentRecord::new("php", "Server-side scripting language");

        [nginx, php].into_iter().collect()
    }

    #[test]
    fn test_render_field_order() {
        let store: RecordStore<ComponentRecord> =
            [ComponentRecord::installed("nginx")].into_iter().collect();

        let expected = r#"{
  "components": [
    {
      "name": "nginx",
      "version": "",
      "description": "",
      "installed": true
    }
  ]
}
"#;
        assert_eq!(render(&store).unwrap(), expected);
    }

    #[test]
    fn test_render_empty_store() {
        let store = RecordStore::new();
        assert_eq!(render(&store).unwrap(), "{\n  \"components\": []\n}\n");
    }

    #[test]
    fn test_write_read_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("components/registry.json");
        let store = sample_store();

        write(&path, &store).unwrap();
        let loaded = read(&path);

        let original: Vec<&ComponentRecord> = store.all().collect();
        let reloaded: Vec<&ComponentRecord> = loaded.all().collect();
        assert_eq!(original, reloaded);
    }

    #[test]
    fn test_write_is_byte_identical() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("registry.json");
        let store = sample_store();

        write(&path, &store).unwrap();
        let first = fs::read(&path).unwrap();
        write(&path, &store).unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_dependencies_survive_round_trip() {
        let mut record = ComponentRecord::installed("moveit2");
        record.dependencies = vec!["ros2".to_string(), "gazebo".to_string()];
        let store: RecordStore<ComponentRecord> = [record.clone()].into_iter().collect();

        let loaded = parse(&render(&store).unwrap());
        assert_eq!(loaded.get("moveit2"), Some(&record));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        assert!(read(&temp_dir.path().join("absent.json")).is_empty());
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let text = r#"{
  "components": [
    { "name": "nginx", "installed": true },
    { "version": "1.0" },
    { "name": "php", "installed": "yes" },
    "redis",
    { "name": "", "installed": true },
    { "name": "docker", "description": "has {braces} and \"quotes\"" }
  ]
}"#;
        let store = parse(text);

        let names: Vec<&str> = store.all().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["docker", "nginx"]);
        assert_eq!(
            store.get("docker").unwrap().description,
            "has {braces} and \"quotes\""
        );
        assert!(store.get("nginx").unwrap().installed);
    }

    #[test]
    fn test_unparsable_document_is_empty() {
        assert!(parse("{\"components\": [ {\"name\": \"nginx\"").is_empty());
        assert!(parse("not json").is_empty());
        assert!(parse("{\"plugins\": []}").is_empty());
    }
}
