//! Compiler configuration — loaded from ~/.boxc/config.yaml.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// User configuration. Every field is optional in the YAML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxcConfig {
    /// Directories searched for plugin files, in load order.
    #[serde(default = "default_plugin_dirs")]
    pub plugin_dirs: Vec<PathBuf>,
    /// Extension of the output file written next to the input.
    #[serde(default = "default_output_extension")]
    pub output_extension: String,
    /// `tracing` filter directive, e.g. "debug" or "boxc=info".
    #[serde(default)]
    pub log_filter: Option<String>,
}

fn default_plugin_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("plugins")]
}

fn default_output_extension() -> String {
    "html".to_string()
}

impl Default for BoxcConfig {
    fn default() -> Self {
        Self {
            plugin_dirs: default_plugin_dirs(),
            output_extension: default_output_extension(),
            log_filter: None,
        }
    }
}

/// Default path for the config file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".boxc").join("config.yaml"))
}

impl BoxcConfig {
    /// Load from the standard path, falling back to defaults when there is
    /// no home directory or no file.
    pub fn load() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Output path for `input`: same directory and stem, configured extension.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        input.with_extension(&self.output_extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config() {
        let config = BoxcConfig::default();
        assert_eq!(config.plugin_dirs, vec![PathBuf::from("plugins")]);
        assert_eq!(config.output_extension, "html");
        assert!(config.log_filter.is_none());
    }

    #[test]
    fn partial_yaml_config() {
        let config: BoxcConfig = serde_yaml::from_str("log_filter: debug\n").unwrap();
        assert_eq!(config.log_filter.as_deref(), Some("debug"));
        assert_eq!(config.output_extension, "html");
        assert_eq!(config.plugin_dirs.len(), 1);
    }

    #[test]
    fn load_missing_file_returns_default() {
        let config = BoxcConfig::load_from(Path::new("/nonexistent/boxc/config.yaml")).unwrap();
        assert_eq!(config, BoxcConfig::default());
    }

    #[test]
    fn load_from_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "plugin_dirs: [/opt/boxc/plugins, ./local]\noutput_extension: htm\n",
        )
        .unwrap();
        let config = BoxcConfig::load_from(file.path()).unwrap();
        assert_eq!(
            config.plugin_dirs,
            vec![PathBuf::from("/opt/boxc/plugins"), PathBuf::from("./local")]
        );
        assert_eq!(
            config.output_path(Path::new("site/index.box")),
            PathBuf::from("site/index.htm")
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "plugin_dirs: {unclosed").unwrap();
        let err = BoxcConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn serialize_deserialize() {
        let config = BoxcConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: BoxcConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
