//! YAML component manifests.
//!
//! ```yaml
//! metadata:
//!   name: Advanced Component
//!   author: Plugin Author
//!   version: "1.0"
//! components:
//!   Hej:
//!     tag: div
//!     content: "{{data_list}}<div>{{children}}</div>"
//!     attrs: [class]
//!     default_css: ".hej{padding:10px}"
//!     default_script: "init({{data_json[0]}})"
//!     allow_children: "*"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::descriptor::{ComponentDescriptor, NameSet};
use super::{ComponentSource, LoadError, PluginMetadata, Registry};

#[derive(Debug, Clone, Default, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    metadata: Option<PluginMetadata>,
    /// Kept in document order so a later entry replaces an earlier one
    /// whose name differs only by case.
    #[serde(default, deserialize_with = "deserialize_components")]
    components: Vec<(String, ManifestComponent)>,
}

/// Descriptor fields as written in YAML; all optional.
#[derive(Debug, Clone, Default, Deserialize)]
struct ManifestComponent {
    tag: Option<String>,
    content: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    selfclosing: bool,
    #[serde(default)]
    attrs: Vec<String>,
    #[serde(default)]
    default_css: String,
    #[serde(default)]
    default_script: String,
    #[serde(default)]
    allow_children: NameSet,
    #[serde(default)]
    allow_attrs: NameSet,
    #[serde(default)]
    deny_attrs: Vec<String>,
}

/// Map entries in document order.
fn deserialize_components<'de, D>(
    deserializer: D,
) -> Result<Vec<(String, ManifestComponent)>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct ComponentsVisitor;

    impl<'de> de::Visitor<'de> for ComponentsVisitor {
        type Value = Vec<(String, ManifestComponent)>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a map of component names to definitions")
        }

        fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(ComponentsVisitor)
}

/// `true` or `"true"`; any other scalar is false.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct FlagVisitor;

    impl<'de> de::Visitor<'de> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a boolean or string")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(v)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v == "true")
        }

        fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
            Ok(false)
        }

        fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
            Ok(false)
        }

        fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
            Ok(false)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(false)
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}

impl ManifestComponent {
    fn into_descriptor(self, name: &str) -> ComponentDescriptor {
        let mut d = ComponentDescriptor::new(name)
            .self_closing(self.selfclosing)
            .with_attrs(self.attrs)
            .with_default_css(self.default_css)
            .with_default_script(self.default_script)
            .with_allow_children(self.allow_children)
            .with_allow_attrs(self.allow_attrs)
            .with_deny_attrs(self.deny_attrs);
        if let Some(tag) = self.tag {
            d.tag = tag;
        }
        if let Some(content) = self.content {
            d.content = content;
        }
        d
    }
}

/// A YAML manifest on disk (or in memory for tests).
#[derive(Debug, Clone)]
pub struct YamlManifest {
    path: PathBuf,
    source: String,
}

impl YamlManifest {
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_source(path, source))
    }

    pub fn from_source(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }
}

impl ComponentSource for YamlManifest {
    fn populate(&self, registry: &mut Registry) -> Result<(), LoadError> {
        let file: ManifestFile =
            serde_yaml::from_str(&self.source).map_err(|source| LoadError::Yaml {
                path: self.path.clone(),
                source,
            })?;
        if let Some(metadata) = file.metadata.filter(|m| !m.is_empty()) {
            registry.add_metadata(metadata);
        }
        for (name, component) in file.components {
            tracing::debug!(
                component = %name,
                path = %self.path.display(),
                "registering component"
            );
            let descriptor = component.into_descriptor(&name);
            registry.register(&name, descriptor);
        }
        Ok(())
    }
}
