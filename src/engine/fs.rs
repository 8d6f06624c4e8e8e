//! Filesystem primitives for node mutations.
use std::path::{Path, PathBuf};

use crate::error::EngineError;

use super::registry::normalize;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<(), EngineError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(EngineError::io(parent))?;
    }
    Ok(())
}

/// Remove an existing file or symlink at `path`, including broken symlinks.
///
/// Does nothing if `path` does not exist.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_existing(path: &Path) -> Result<(), EngineError> {
    if path.symlink_metadata().is_ok() {
        std::fs::remove_file(path).map_err(EngineError::io(path))?;
    }
    Ok(())
}

/// `true` if `path` is a symlink whose target does not exist.
#[must_use]
pub fn is_dangling_link(path: &Path) -> bool {
    path.symlink_metadata().is_ok_and(|m| m.is_symlink()) && !path.exists()
}

/// Where the symlink at `link` points, with relative destinations resolved
/// against the link's parent directory. `None` if `link` is not a symlink.
#[must_use]
pub fn link_destination(link: &Path) -> Option<PathBuf> {
    let dest = std::fs::read_link(link).ok()?;
    if dest.is_relative() {
        Some(link.parent().map_or_else(|| dest.clone(), |p| p.join(&dest)))
    } else {
        Some(dest)
    }
}

/// Compare two paths after lexical normalization, ignoring the Windows
/// verbatim (`\\?\`) prefix.
#[must_use]
pub fn paths_equal(a: &Path, b: &Path) -> bool {
    normalize(dunce::simplified(a)) == normalize(dunce::simplified(b))
}

/// Create a symlink at `link` pointing to `target`.
///
/// # Errors
///
/// Returns an error if the link cannot be created.
pub fn create_symlink(target: &Path, link: &Path) -> Result<(), EngineError> {
    #[cfg(unix)]
    std::os::unix::fs::symlink(target, link).map_err(EngineError::io(link))?;

    #[cfg(windows)]
    std::os::windows::fs::symlink_file(target, link).map_err(EngineError::io(link))?;

    Ok(())
}

/// Suffix of the temp files [`replace_with_copy`] stages content into.
pub const STAGING_SUFFIX: &str = ".dotlayers_tmp";

/// `true` if `path` names a staging file left by [`replace_with_copy`].
#[must_use]
pub fn is_staging_file(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().ends_with(STAGING_SUFFIX))
}

/// Hidden sibling of `dest` used to stage its new content.
fn staging_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
    dest.with_file_name(format!(".{name}{STAGING_SUFFIX}"))
}

/// Overwrite `dest` with the content of `src`, following symlinks at `src`.
///
/// The content is staged to a hidden sibling temp file first and renamed
/// into place, so `dest` is never left truncated.
///
/// # Errors
///
/// Returns an error if the copy or the rename fails; the temp file is
/// removed on failure.
pub fn replace_with_copy(src: &Path, dest: &Path) -> Result<(), EngineError> {
    let tmp = staging_path(dest);
    std::fs::copy(src, &tmp).map_err(EngineError::io(&tmp))?;

    if let Err(e) = std::fs::rename(&tmp, dest) {
        let _ = std::fs::remove_file(&tmp);
        return Err(EngineError::io(dest)(e));
    }
    Ok(())
}
