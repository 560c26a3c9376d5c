use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which registry a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Component,
    Plugin,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Component => f.write_str("component"),
            RecordKind::Plugin => f.write_str("plugin"),
        }
    }
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("{kind} '{name}' is not installed")]
    NotFound { kind: RecordKind, name: String },

    #[error("{kind} '{name}' is already installed")]
    AlreadyExists { kind: RecordKind, name: String },

    #[error("invalid {kind} name '{name}'")]
    InvalidName { kind: RecordKind, name: String },

    #[error("failed to {action} {kind} '{name}'")]
    ExternalFailure {
        kind: RecordKind,
        name: String,
        action: &'static str,
    },

    #[error("no supported package manager found (tried apt-get, yum, dnf, pacman)")]
    UnsupportedEnvironment,

    #[error("failed to write {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode registry data: {0}")]
    Encode(#[from] serde_json::Error),
}

impl RegistryError {
    pub(crate) fn not_found(kind: RecordKind, name: &str) -> Self {
        Self::NotFound {
            kind,
            name: name.to_string(),
        }
    }

    pub(crate) fn external(kind: RecordKind, name: &str, action: &'static str) -> Self {
        Self::ExternalFailure {
            kind,
            name: name.to_string(),
            action,
        }
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }
}
