//! Overlay images read from disk
//!
//! A name found in the configured overlay table resolves to its path;
//! anything else is treated as a path itself. Paths are relative to the
//! overlay root, with a leading `/` stripped.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use image::DynamicImage;

use crate::config::Config;
use crate::error::ItsError;
use crate::security::sanitize_relative_path;
use crate::transform::OverlaySource;

#[derive(Debug, Clone)]
pub struct FileOverlays {
    root: PathBuf,
    table: BTreeMap<String, String>,
}

impl FileOverlays {
    pub fn new(root: impl Into<PathBuf>, table: BTreeMap<String, String>) -> Self {
        Self {
            root: root.into(),
            table,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.overlay_root.clone(), config.overlays.clone())
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, ItsError> {
        let raw = self.table.get(name).map(String::as_str).unwrap_or(name);
        Ok(self.root.join(sanitize_relative_path(raw)?))
    }
}

impl OverlaySource for FileOverlays {
    fn load(&self, name: &str) -> Result<DynamicImage, ItsError> {
        let path = self.path_for(name)?;
        let bytes = fs::read(&path).map_err(|e| {
            tracing::info!(overlay = name, path = %path.display(), error = %e, "Overlay not readable");
            ItsError::not_found(name)
        })?;

        image::load_from_memory(&bytes).map_err(|_| ItsError::NotAnImage {
            path: name.to_string(),
        })
    }
}
