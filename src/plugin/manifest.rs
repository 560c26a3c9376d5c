use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RegistryError;
use crate::store::{self, Record};

pub const METADATA_FILE: &str = "metadata.json";

/// An installed plugin. Presence in the registry means installed.
///
/// Serializes as the per-plugin `metadata.json` document:
/// `{ name, version, enabled, installedAt }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginRecord {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(skip)]
    pub description: String,
    #[serde(default)]
    pub enabled: bool,
    /// Local time, `YYYY-MM-DDTHH:MM:SS`.
    #[serde(default)]
    pub installed_at: String,
}

impl PluginRecord {
    /// A freshly installed plugin: enabled, stamped with the current local time.
    pub fn installed_now(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            installed_at: timestamp_now(),
            ..Self::default()
        }
    }
}

impl Record for PluginRecord {
    fn name(&self) -> &str {
        &self.name
    }
}

pub fn timestamp_now() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

pub fn metadata_path(plugin_dir: &Path) -> PathBuf {
    plugin_dir.join(METADATA_FILE)
}

/// Write `<plugins_dir>/<name>/metadata.json`, creating the directory.
pub fn write_metadata(plugins_dir: &Path, record: &PluginRecord) -> Result<(), RegistryError> {
    let path = metadata_path(&plugins_dir.join(&record.name));
    let mut text = serde_json::to_string_pretty(record)?;
    text.push('\n');
    store::write_atomic(&path, &text)
}

pub fn read_metadata(plugin_dir: &Path) -> Result<PluginRecord, String> {
    let path = metadata_path(plugin_dir);
    let raw = fs::read_to_string(&path).map_err(|err| format!("{}: {err}", path.display()))?;

    serde_json::from_str::<PluginRecord>(&raw).map_err(|err| format!("{}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_installed_now_shape() {
        let record = PluginRecord::installed_now("opencv");

        assert_eq!(record.name, "opencv");
        assert!(record.enabled);
        assert!(record.version.is_empty());
        assert!(chrono::NaiveDateTime::parse_from_str(&record.installed_at, "%Y-%m-%dT%H:%M:%S").is_ok());
    }

    #[test]
    fn test_metadata_document_fields() {
        let temp_dir = TempDir::new().unwrap();
        let record = PluginRecord {
            name: "ros2".to_string(),
            version: "humble".to_string(),
            description: "not persisted".to_string(),
            enabled: false,
            installed_at: "2025-03-01T09:30:00".to_string(),
        };

        write_metadata(temp_dir.path(), &record).unwrap();
        let text = fs::read_to_string(temp_dir.path().join("ros2/metadata.json")).unwrap();

        let expected = r#"{
  "name": "ros2",
  "version": "humble",
  "enabled": false,
  "installedAt": "2025-03-01T09:30:00"
}
"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn test_read_metadata_restores_fields() {
        let temp_dir = TempDir::new().unwrap();
        let mut record = PluginRecord::installed_now("pytorch");
        record.enabled = false;
        write_metadata(temp_dir.path(), &record).unwrap();

        let loaded = read_metadata(&temp_dir.path().join("pytorch")).unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_read_metadata_reports_path_on_error() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("broken");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(METADATA_FILE), "{ \"name\": ").unwrap();

        let err = read_metadata(&dir).unwrap_err();
        assert!(err.contains("metadata.json"));
    }
}
