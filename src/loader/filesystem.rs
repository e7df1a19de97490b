//! Local directory backend
//!
//! Roots are searched in order: every entry of `folders`, then every entry
//! of `prefixes`. A filename without an extension matches the first file in
//! the directory (sorted by name) whose stem equals it, so `tests/seagull`
//! finds `tests/seagull.jpg`.

use std::fs;
use std::path::{Path, PathBuf};

use super::Backend;
use crate::config::{LoaderKind, NamespaceConfig};
use crate::error::ItsError;
use crate::security::sanitize_relative_path;

#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystemBackend;

impl Backend for FileSystemBackend {
    fn kind(&self) -> LoaderKind {
        LoaderKind::FileSystem
    }

    fn fetch(
        &self,
        namespace: &str,
        config: &NamespaceConfig,
        filename: &str,
    ) -> Result<Vec<u8>, ItsError> {
        let relative = sanitize_relative_path(filename)?;

        for root in config.folders.iter().chain(config.prefixes.iter()) {
            let candidate = Path::new(root).join(&relative);
            if let Some(path) = resolve(&candidate) {
                tracing::debug!(namespace, path = %path.display(), "Reading source file");
                return fs::read(&path).map_err(|e| {
                    tracing::error!(path = %path.display(), error = %e, "Failed to read source file");
                    ItsError::internal(format!("Failed to read {}: {}", path.display(), e))
                });
            }
        }

        Err(ItsError::not_found(format!("{}/{}", namespace, filename)))
    }
}

fn resolve(candidate: &Path) -> Option<PathBuf> {
    if candidate.is_file() {
        return Some(candidate.to_path_buf());
    }
    if candidate.extension().is_some() {
        return None;
    }

    let stem = candidate.file_name()?;
    let parent = match candidate.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut matches: Vec<PathBuf> = fs::read_dir(parent)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.file_stem() == Some(stem))
        .collect();
    matches.sort();
    matches.into_iter().next()
}
