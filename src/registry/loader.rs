//! Plugin directories.
//!
//! `default.box` is loaded first so that every other plugin file can
//! override its components. The remaining files load in file-name order.

use std::path::{Path, PathBuf};

use super::box_plugin::BoxPlugin;
use super::manifest::YamlManifest;
use super::{ComponentSource, LoadError, Registry};

/// File that is always loaded before the rest of a plugin directory.
pub const DEFAULT_PLUGIN: &str = "default.box";

#[derive(Debug, Clone)]
pub struct PluginDir {
    path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PluginKind {
    Box,
    Yaml,
}

fn plugin_kind(path: &Path) -> Option<PluginKind> {
    match path.extension()?.to_str()? {
        "box" => Some(PluginKind::Box),
        "yaml" | "yml" => Some(PluginKind::Yaml),
        _ => None,
    }
}

impl PluginDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Plugin files in load order.
    pub fn plugin_files(&self) -> Result<Vec<PathBuf>, LoadError> {
        let io_err = |source| LoadError::Io {
            path: self.path.clone(),
            source,
        };
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.path).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && plugin_kind(&path).is_some() {
                files.push(path);
            }
        }
        files.sort_by_key(|p| {
            let is_default = p.file_name().is_some_and(|n| n == DEFAULT_PLUGIN);
            (!is_default, p.file_name().map(|n| n.to_os_string()))
        });
        Ok(files)
    }
}

impl ComponentSource for PluginDir {
    fn populate(&self, registry: &mut Registry) -> Result<(), LoadError> {
        if !self.path.is_dir() {
            tracing::debug!(path = %self.path.display(), "plugin directory not found, skipping");
            return Ok(());
        }
        for file in self.plugin_files()? {
            tracing::info!(path = %file.display(), "loading plugin");
            match plugin_kind(&file) {
                Some(PluginKind::Box) => BoxPlugin::open(&file)?.populate(registry)?,
                Some(PluginKind::Yaml) => YamlManifest::open(&file)?.populate(registry)?,
                None => {}
            }
        }
        Ok(())
    }
}
