use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::RegistryError;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.+-]*$").expect("valid name regex"));

/// A record that can live in a [`RecordStore`].
pub trait Record {
    fn name(&self) -> &str;
}

/// Name-keyed records for one registry kind.
///
/// Iteration is lexicographic by name so listings and the persisted form
/// are reproducible.
#[derive(Debug, Clone)]
pub struct RecordStore<R> {
    records: BTreeMap<String, R>,
}

impl<R> Default for RecordStore<R> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }
}

impl<R: Record> RecordStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&R> {
        self.records.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut R> {
        self.records.get_mut(name)
    }

    /// Insert under the record's own name, returning whatever it replaced.
    pub fn put(&mut self, record: R) -> Option<R> {
        self.records.insert(record.name().to_string(), record)
    }

    pub fn remove(&mut self, name: &str) -> Option<R> {
        self.records.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn all(&self) -> impl Iterator<Item = &R> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R: Record> FromIterator<R> for RecordStore<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        let mut store = Self::new();
        for record in iter {
            store.put(record);
        }
        store
    }
}

/// Names double as directory names and shell arguments.
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

/// Write through a sibling temp file so readers never see a partial document.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), RegistryError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| RegistryError::persistence(parent, err))?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, contents).map_err(|err| RegistryError::persistence(&tmp_path, err))?;
    fs::rename(&tmp_path, path).map_err(|err| {
        let _ = fs::remove_file(&tmp_path);
        RegistryError::persistence(path, err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        name: String,
        value: u32,
    }

    impl Record for Entry {
        fn name(&self) -> &str {
            &self.name
        }
    }

    fn entry(name: &str, value: u32) -> Entry {
        Entry {
            name: name.to_string(),
            value,
        }
    }

    #[test]
    fn test_put_overwrites_same_name() {
        let mut store = RecordStore::new();
        assert!(store.put(entry("nginx", 1)).is_none());
        let replaced = store.put(entry("nginx", 2));

        assert_eq!(replaced, Some(entry("nginx", 1)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("nginx").unwrap().value, 2);
    }

    #[test]
    fn test_remove_reports_presence() {
        let mut store: RecordStore<Entry> = [entry("php", 1)].into_iter().collect();

        assert_eq!(store.remove("php"), Some(entry("php", 1)));
        assert_eq!(store.remove("php"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_all_is_sorted_by_name() {
        let store: RecordStore<Entry> = [entry("redis", 1), entry("docker", 2), entry("nginx", 3)]
            .into_iter()
            .collect();

        let names: Vec<&str> = store.all().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["docker", "nginx", "redis"]);
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut store: RecordStore<Entry> = [entry("opencv", 1)].into_iter().collect();
        store.get_mut("opencv").unwrap().value = 9;
        assert_eq!(store.get("opencv").unwrap().value, 9);
        assert!(store.get_mut("missing").is_none());
    }

    #[test]
    fn test_name_validation() {
        for name in ["ros2", "robot-arm", "python3-pip", "g++", "libc6.1", "A_b"] {
            assert!(is_valid_name(name), "{name} should be valid");
        }
        for name in ["", "-rf", "../etc", "a/b", "a b", ".hidden", "x;rm"] {
            assert!(!is_valid_name(name), "{name} should be rejected");
        }
    }

    #[test]
    fn test_write_atomic_creates_parent_and_replaces() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/registry.json");

        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp_dir.path().join("nested/registry.json.tmp").exists());
    }

    #[test]
    fn test_write_atomic_reports_persistence_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let err = write_atomic(&blocker.join("registry.json"), "{}").unwrap_err();
        assert!(matches!(err, RegistryError::Persistence { .. }));
    }
}
