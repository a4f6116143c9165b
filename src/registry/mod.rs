//! Component registry — case-insensitive name → descriptor mapping.
//!
//! The registry is filled before compilation by one or more
//! [`ComponentSource`]s and is only read by the compiler.

pub mod box_plugin;
pub mod descriptor;
pub mod loader;
pub mod manifest;

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

pub use box_plugin::BoxPlugin;
pub use descriptor::{ComponentDescriptor, NameSet};
pub use loader::PluginDir;
pub use manifest::YamlManifest;

/// Something that can contribute components to a registry.
pub trait ComponentSource {
    fn populate(&self, registry: &mut Registry) -> Result<(), LoadError>;
}

/// Failure while loading plugin files.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid manifest {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{}:{line}:{col}: {message}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        col: usize,
        message: String,
    },
}

/// Display information a plugin may publish about itself.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PluginMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
}

impl PluginMetadata {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.author.is_empty()
            && self.version.is_empty()
            && self.description.is_empty()
    }
}

impl fmt::Display for PluginMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{} by {}", self.name, self.version, self.author)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    components: HashMap<String, ComponentDescriptor>,
    metadata: Vec<PluginMetadata>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `descriptor` under the lowercased `name`.
    ///
    /// A later registration for the same lowercased name replaces the
    /// earlier one; the replaced descriptor is returned.
    pub fn register(
        &mut self,
        name: &str,
        descriptor: ComponentDescriptor,
    ) -> Option<ComponentDescriptor> {
        let key = name.to_lowercase();
        let previous = self.components.insert(key, descriptor);
        if previous.is_some() {
            tracing::debug!(component = name, "component redefined");
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<&ComponentDescriptor> {
        self.components.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(&name.to_lowercase())
    }

    /// Registered (lowercased) names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.components.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn add_metadata(&mut self, metadata: PluginMetadata) {
        self.metadata.push(metadata);
    }

    /// Plugin metadata in load order.
    pub fn metadata(&self) -> &[PluginMetadata] {
        &self.metadata
    }

    /// Let `source` contribute its components.
    pub fn populate_from(&mut self, source: &impl ComponentSource) -> Result<(), LoadError> {
        source.populate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut reg = Registry::new();
        reg.register("Card", ComponentDescriptor::new("Card"));
        assert!(reg.contains("card"));
        assert!(reg.contains("CARD"));
        assert_eq!(reg.get("cArD").map(|d| d.tag.as_str()), Some("card"));
        assert_eq!(reg.names(), vec!["card"]);
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let mut reg = Registry::new();
        reg.register("Button", ComponentDescriptor::new("Button").with_tag("a"));
        let replaced =
            reg.register("BUTTON", ComponentDescriptor::new("BUTTON").with_tag("button"));
        assert_eq!(replaced.map(|d| d.tag), Some("a".to_string()));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("button").unwrap().tag, "button");
    }

    #[test]
    fn metadata_display() {
        let meta = PluginMetadata {
            name: "Cards".to_string(),
            author: "Jo".to_string(),
            version: "1.2".to_string(),
            description: String::new(),
        };
        assert_eq!(meta.to_string(), "Cards v1.2 by Jo");
        assert!(!meta.is_empty());
        assert!(PluginMetadata::default().is_empty());
    }

    struct Fixed;

    impl ComponentSource for Fixed {
        fn populate(&self, registry: &mut Registry) -> Result<(), LoadError> {
            registry.register("fixed", ComponentDescriptor::new("fixed"));
            Ok(())
        }
    }

    #[test]
    fn populate_from_source() {
        let mut reg = Registry::new();
        reg.populate_from(&Fixed).unwrap();
        assert!(reg.contains("Fixed"));
    }
}
