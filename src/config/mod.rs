// Configuration module
//
// The whole configuration is loaded once at process start into an immutable
// `Config` and handed to the service by reference.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_LOG_LEVEL;

pub mod namespace;
pub mod transform;

pub use namespace::{LoaderKind, NamespaceConfig};
pub use transform::TransformConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend configuration per namespace
    #[serde(default = "default_namespaces")]
    pub namespaces: BTreeMap<String, NamespaceConfig>,

    /// Named overlays, e.g. `passport: tests/images/logo.png`
    #[serde(default = "default_overlays")]
    pub overlays: BTreeMap<String, String>,

    /// Directory overlay paths are resolved against
    #[serde(default = "default_overlay_root")]
    pub overlay_root: PathBuf,

    #[serde(default)]
    pub transform: TransformConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output (default)
    #[default]
    Pretty,
    /// One JSON object per line, for log aggregation
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; RUST_LOG takes precedence when set
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_namespaces() -> BTreeMap<String, NamespaceConfig> {
    let mut namespaces = BTreeMap::new();
    namespaces.insert("default".to_string(), NamespaceConfig::http(&[""]));
    namespaces.insert(
        "overlay".to_string(),
        NamespaceConfig {
            loader: Some(LoaderKind::FileSystem),
            prefixes: vec!["test/overlay".to_string()],
            ..Default::default()
        },
    );
    namespaces.insert(
        "folders".to_string(),
        NamespaceConfig {
            loader: Some(LoaderKind::FileSystem),
            prefixes: vec!["".to_string()],
            ..Default::default()
        },
    );
    namespaces.insert(
        "tests".to_string(),
        NamespaceConfig::file_system(&["tests/images"]),
    );
    namespaces
}

fn default_overlays() -> BTreeMap<String, String> {
    let mut overlays = BTreeMap::new();
    overlays.insert(
        "passport".to_string(),
        "tests/images/logo.png".to_string(),
    );
    overlays
}

fn default_overlay_root() -> PathBuf {
    PathBuf::from(".")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespaces: default_namespaces(),
            overlays: default_overlays(),
            overlay_root: default_overlay_root(),
            transform: TransformConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        // First, check that all referenced environment variables exist
        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            std::env::var(var_name).map_err(|_| {
                format!(
                    "Environment variable '{}' is referenced but not set",
                    var_name
                )
            })?;
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        serde_yaml::from_str(&substituted).map_err(|e| e.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        let config = Self::from_yaml_with_env(&yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.namespaces.is_empty() {
            return Err("At least one namespace must be configured".to_string());
        }

        for (name, namespace) in &self.namespaces {
            if name.is_empty() || name.contains('/') {
                return Err(format!("Invalid namespace name '{}'", name));
            }
            namespace.validate(name)?;
        }

        for (name, path) in &self.overlays {
            if path.trim().is_empty() {
                return Err(format!("Overlay '{}' has an empty path", name));
            }
        }

        self.transform.validate()?;

        Ok(())
    }

    /// Look up a namespace by name
    pub fn namespace(&self, name: &str) -> Option<&NamespaceConfig> {
        self.namespaces.get(name)
    }
}
