use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::component::registry_file;
use crate::error::{RecordKind, RegistryError};
use crate::executor::{PackageExecutor, PackageManager};
use crate::model::component::ComponentRecord;
use crate::store::{self, RecordStore};

/// System packages installed through the host package manager.
///
/// The store is written back only by [`ComponentManager::save`] (the app
/// calls it at shutdown when something changed).
pub struct ComponentManager {
    registry_file: PathBuf,
    store: RecordStore<ComponentRecord>,
    executor: Rc<dyn PackageExecutor>,
    package_manager: OnceCell<Option<PackageManager>>,
    dirty: bool,
}

impl ComponentManager {
    pub fn new(registry_file: PathBuf, executor: Rc<dyn PackageExecutor>) -> Self {
        let store = registry_file::read(&registry_file);
        tracing::debug!(
            "loaded {} component record(s) from {}",
            store.len(),
            registry_file.display()
        );

        Self {
            registry_file,
            store,
            executor,
            package_manager: OnceCell::new(),
            dirty: false,
        }
    }

    pub fn registry_file(&self) -> &Path {
        &self.registry_file
    }

    /// Detected once, on first use.
    pub fn package_manager(&self) -> Option<PackageManager> {
        *self
            .package_manager
            .get_or_init(|| PackageManager::detect(self.executor.as_ref()))
    }

    pub fn list_installed(&self) -> Vec<&ComponentRecord> {
        self.store.all().filter(|c| c.installed).collect()
    }

    /// Case-sensitive substring match on name or description.
    pub fn search(&self, keyword: &str) -> Vec<&ComponentRecord> {
        self.store
            .all()
            .filter(|c| c.name.contains(keyword) || c.description.contains(keyword))
            .collect()
    }

    /// Install through the package manager. Reinstalling reruns the command
    /// and overwrites the record.
    pub fn install(&mut self, name: &str) -> Result<(), RegistryError> {
        if !store::is_valid_name(name) {
            return Err(RegistryError::InvalidName {
                kind: RecordKind::Component,
                name: name.to_string(),
            });
        }

        tracing::info!("installing component {name}");
        let manager = self
            .package_manager()
            .ok_or(RegistryError::UnsupportedEnvironment)?;

        if !self.executor.run(&manager.install_command(name)) {
            tracing::error!("failed to install component {name}");
            return Err(RegistryError::external(RecordKind::Component, name, "install"));
        }

        self.store.put(ComponentRecord::installed(name));
        self.dirty = true;
        tracing::info!("component {name} installed");
        Ok(())
    }

    pub fn uninstall(&mut self, name: &str) -> Result<ComponentRecord, RegistryError> {
        if !self.store.contains(name) {
            return Err(RegistryError::not_found(RecordKind::Component, name));
        }

        tracing::info!("uninstalling component {name}");
        let manager = self
            .package_manager()
            .ok_or(RegistryError::UnsupportedEnvironment)?;

        if !self.executor.run(&manager.remove_command(name)) {
            tracing::error!("failed to uninstall component {name}");
            return Err(RegistryError::external(
                RecordKind::Component,
                name,
                "uninstall",
            ));
        }

        let removed = self
            .store
            .remove(name)
            .ok_or_else(|| RegistryError::not_found(RecordKind::Component, name))?;
        self.dirty = true;
        tracing::info!("component {name} uninstalled");
        Ok(removed)
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.store.get(name).is_some_and(|c| c.installed)
    }

    /// The stored record, or an empty one when the name is unknown.
    pub fn info(&self, name: &str) -> ComponentRecord {
        self.store.get(name).cloned().unwrap_or_default()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the whole store to the registry file.
    pub fn save(&mut self) -> Result<(), RegistryError> {
        registry_file::write(&self.registry_file, &self.store)?;
        self.dirty = false;
        Ok(())
    }

    /// Shutdown hook: persist only when this run changed something.
    pub fn save_if_dirty(&mut self) {
        if !self.is_dirty() {
            return;
        }

        if let Err(err) = self.save() {
            tracing::warn!("component registry not saved: {err}");
        }
    }
}
