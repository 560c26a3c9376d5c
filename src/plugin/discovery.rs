use ignore::WalkBuilder;
use std::path::Path;

use crate::plugin::installer;
use crate::plugin::manifest::{self, PluginRecord};
use crate::store::RecordStore;

/// How much of a plugin directory is trusted at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscoveryMode {
    /// A directory with a `metadata.json` is an installed, enabled plugin.
    /// Nothing else is read back, so a disabled plugin comes back enabled.
    #[default]
    Presence,
    /// Restore version, enabled flag and install time from `metadata.json`.
    /// Unreadable documents fall back to [`DiscoveryMode::Presence`].
    Metadata,
}

/// Build the plugin store from the subdirectories of `plugins_dir`.
pub fn discover(plugins_dir: &Path, mode: DiscoveryMode) -> RecordStore<PluginRecord> {
    let mut store = RecordStore::new();

    if !plugins_dir.is_dir() {
        return store;
    }

    let entries = WalkBuilder::new(plugins_dir)
        .max_depth(Some(1))
        .standard_filters(false)
        .hidden(true)
        .build()
        .flatten()
        .filter(|entry| entry.path() != plugins_dir)
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_dir()));

    for entry in entries {
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!("skipping non-UTF-8 plugin directory {}", entry.path().display());
            continue;
        };

        let dir = entry.path();
        if !manifest::metadata_path(dir).is_file() {
            tracing::debug!("ignoring {}: no {}", dir.display(), manifest::METADATA_FILE);
            continue;
        }

        let record = match mode {
            DiscoveryMode::Presence => presence_record(name),
            DiscoveryMode::Metadata => match manifest::read_metadata(dir) {
                Ok(record) => PluginRecord {
                    description: builtin_description(&name),
                    name,
                    ..record
                },
                Err(err) => {
                    tracing::warn!("plugin metadata unreadable, assuming enabled: {err}");
                    presence_record(name)
                }
            },
        };
        store.put(record);
    }

    if store.is_empty() {
        tracing::debug!("no plugins in {}", plugins_dir.display());
    } else {
        tracing::debug!(
            "discovered {} plugin(s) in {}",
            store.len(),
            plugins_dir.display()
        );
    }
    store
}

/// `metadata.json` does not carry a description; built-ins get theirs back.
fn builtin_description(name: &str) -> String {
    installer::find(name)
        .map(|builtin| builtin.description.to_string())
        .unwrap_or_default()
}

fn presence_record(name: String) -> PluginRecord {
    PluginRecord {
        description: builtin_description(&name),
        name,
        enabled: true,
        ..PluginRecord::default()
    }
}
