use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::plugin::discovery::DiscoveryMode;

const DEFAULTS: &str = include_str!("../../config/default.toml");

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub logging: LoggingConfig,
    pub plugins: PluginsConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    pub install_root: String,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
    pub color: bool,
}

#[derive(Debug, Deserialize)]
pub struct PluginsConfig {
    pub restore_metadata: bool,
}

impl AppConfig {
    /// Load configuration with layering: defaults → user config.
    ///
    /// `explicit` replaces the per-user config path and must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let user_path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => user_config_path().filter(|path| path.exists()),
        };

        let user_str = match user_path {
            Some(path) => Some(
                fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config {}", path.display()))?,
            ),
            None => None,
        };

        Self::from_layers(user_str.as_deref())
    }

    /// Merge a user layer (if any) over the compiled-in defaults, key by key.
    pub fn from_layers(user: Option<&str>) -> Result<Self> {
        let mut merged: toml::Table =
            toml::from_str(DEFAULTS).context("failed to parse default config")?;

        if let Some(user_str) = user {
            let user_table: toml::Table =
                toml::from_str(user_str).context("failed to parse user config")?;
            merge_tables(&mut merged, user_table);
        }

        let mut config: AppConfig = toml::Value::Table(merged)
            .try_into()
            .context("invalid configuration")?;

        config.general.install_root = expand_tilde(&config.general.install_root)?;
        if let Some(file) = config.logging.file.take() {
            config.logging.file = Some(PathBuf::from(expand_tilde(&file.to_string_lossy())?));
        }

        Ok(config)
    }

    pub fn install_root(&self) -> PathBuf {
        PathBuf::from(&self.general.install_root)
    }

    pub fn components_dir(&self) -> PathBuf {
        self.install_root().join("components")
    }

    pub fn components_file(&self) -> PathBuf {
        self.components_dir().join("registry.json")
    }

    pub fn plugins_dir(&self) -> PathBuf {
        self.install_root().join("plugins")
    }

    pub fn discovery_mode(&self) -> DiscoveryMode {
        if self.plugins.restore_metadata {
            DiscoveryMode::Metadata
        } else {
            DiscoveryMode::Presence
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "linuxstudio")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn expand_tilde(path: &str) -> Result<String> {
    if !path.starts_with('~') {
        return Ok(path.to_string());
    }

    let home = directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(path.replacen('~', &home.to_string_lossy(), 1))
}
