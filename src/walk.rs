//! Directory enumeration for layer trees and hook directories.
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::EngineError;

/// List every non-directory entry under `root`, recursively, as paths
/// relative to `root`, in file-name order.
///
/// The root itself is skipped. A missing root yields an empty list.
///
/// # Errors
///
/// Returns an error if an entry below an existing root cannot be read.
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>, EngineError> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| EngineError::Io {
            path: e
                .path()
                .map_or_else(|| root.display().to_string(), |p| p.display().to_string()),
            source: e.into(),
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(root) {
            files.push(rel.to_path_buf());
        }
    }
    Ok(files)
}

/// List the layer directories directly under `root`, in name order.
///
/// Hidden directories (e.g. `.git`) and plain files are skipped.
///
/// # Errors
///
/// Returns an error if `root` cannot be read.
pub fn list_layer_dirs(root: &Path) -> Result<Vec<PathBuf>, EngineError> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| EngineError::Io {
            path: root.display().to_string(),
            source: e.into(),
        })?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if entry.file_type().is_dir() && !hidden {
            dirs.push(entry.into_path());
        }
    }
    Ok(dirs)
}
