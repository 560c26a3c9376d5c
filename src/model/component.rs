use serde::{Deserialize, Serialize};

use crate::store::Record;

/// A system package tracked by the component registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub installed: bool,
    /// Names of other components; never checked against the store.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl ComponentRecord {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn installed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            installed: true,
            ..Self::default()
        }
    }
}

impl Record for ComponentRecord {
    fn name(&self) -> &str {
        &self.name
    }
}
