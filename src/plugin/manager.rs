use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{RecordKind, RegistryError};
use crate::executor::PackageExecutor;
use crate::plugin::discovery::{self, DiscoveryMode};
use crate::plugin::installer::{self, InstallOutcome};
use crate::plugin::manifest::{self, PluginRecord};
use crate::store::{self, RecordStore};

/// Result of a successful [`PluginManager::install`].
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub record: PluginRecord,
    pub outcome: InstallOutcome,
}

/// Plugins live one per directory under `root`; every mutation rewrites
/// that plugin's `metadata.json` right away.
///
/// Only records installed or changed during this run are ever written.
/// A record rebuilt by presence discovery is missing its stored fields and
/// must not overwrite the document it came from.
pub struct PluginManager {
    root: PathBuf,
    store: RecordStore<PluginRecord>,
    executor: Rc<dyn PackageExecutor>,
    touched: BTreeSet<String>,
}

impl PluginManager {
    pub fn new(root: PathBuf, executor: Rc<dyn PackageExecutor>, mode: DiscoveryMode) -> Self {
        if let Err(err) = std::fs::create_dir_all(&root) {
            tracing::debug!("cannot create plugin root {}: {err}", root.display());
        }

        let store = discovery::discover(&root, mode);
        Self {
            root,
            store,
            executor,
            touched: BTreeSet::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn list_installed(&self) -> Vec<&PluginRecord> {
        self.store.all().collect()
    }

    pub fn plugin_count(&self) -> usize {
        self.store.len()
    }

    pub fn enabled_count(&self) -> usize {
        self.store.all().filter(|p| p.enabled).count()
    }

    pub fn install(&mut self, name: &str) -> Result<InstallReport, RegistryError> {
        if self.store.contains(name) {
            tracing::warn!("plugin {name} is already installed");
            return Err(RegistryError::AlreadyExists {
                kind: RecordKind::Plugin,
                name: name.to_string(),
            });
        }

        if !store::is_valid_name(name) {
            return Err(RegistryError::InvalidName {
                kind: RecordKind::Plugin,
                name: name.to_string(),
            });
        }

        tracing::info!("installing plugin {name}");
        let outcome = match installer::find(name) {
            Some(builtin) => builtin.run(self.executor.as_ref()),
            None => Some(installer::reserve_directory(&self.root.join(name))),
        };

        let Some(outcome) = outcome else {
            tracing::error!("failed to install plugin {name}");
            return Err(RegistryError::external(RecordKind::Plugin, name, "install"));
        };

        let mut record = PluginRecord::installed_now(name);
        if let Some(builtin) = installer::find(name) {
            record.description = builtin.description.to_string();
        }
        self.store.put(record.clone());
        self.touched.insert(name.to_string());
        self.persist(&record);

        tracing::info!("plugin {name} installed");
        Ok(InstallReport { record, outcome })
    }

    pub fn uninstall(&mut self, name: &str) -> Result<PluginRecord, RegistryError> {
        if !self.store.contains(name) {
            return Err(RegistryError::not_found(RecordKind::Plugin, name));
        }

        tracing::info!("uninstalling plugin {name}");
        let plugin_dir = self.root.join(name);
        let command = format!(
            "rm -rf {}",
            shell_words::quote(&plugin_dir.to_string_lossy())
        );

        if !self.executor.run(&command) {
            tracing::error!("failed to remove {}", plugin_dir.display());
            return Err(RegistryError::external(RecordKind::Plugin, name, "uninstall"));
        }

        let removed = self
            .store
            .remove(name)
            .ok_or_else(|| RegistryError::not_found(RecordKind::Plugin, name))?;
        self.touched.remove(name);
        tracing::info!("plugin {name} uninstalled");
        Ok(removed)
    }

    pub fn enable(&mut self, name: &str) -> Result<(), RegistryError> {
        self.set_enabled(name, true)
    }

    pub fn disable(&mut self, name: &str) -> Result<(), RegistryError> {
        self.set_enabled(name, false)
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.store.contains(name)
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.store.get(name).is_some_and(|p| p.enabled)
    }

    /// The stored record, or an empty one when the name is unknown.
    pub fn info(&self, name: &str) -> PluginRecord {
        self.store.get(name).cloned().unwrap_or_default()
    }

    /// Shutdown hook: rewrite the metadata of every plugin touched this run.
    pub fn save_all(&self) {
        let touched = self
            .store
            .all()
            .filter(|record| self.touched.contains(&record.name));
        for record in touched {
            self.persist(record);
        }
    }

    fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), RegistryError> {
        let Some(record) = self.store.get_mut(name) else {
            return Err(RegistryError::not_found(RecordKind::Plugin, name));
        };

        record.enabled = enabled;
        let record = record.clone();
        self.touched.insert(record.name.clone());
        self.persist(&record);

        tracing::info!(
            "plugin {name} {}",
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(())
    }

    /// Persistence is best effort; the in-memory record stays authoritative.
    fn persist(&self, record: &PluginRecord) {
        if let Err(err) = manifest::write_metadata(&self.root, record) {
            tracing::warn!("plugin {} metadata not saved: {err}", record.name);
        }
    }
}
