//! Runtime configuration: where layers live, where they are linked to, and
//! the optional `dotlayers.toml` settings file at the root.
pub mod paths;
pub mod toml_loader;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::engine::HookSettings;
use crate::engine::compare::{ByteComparator, ContentComparator, GitDiffComparator};
use crate::error::ConfigError;
use crate::exec::Executor;
use crate::logging::Log;

/// How file contents are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareMethod {
    /// In-process byte comparison.
    #[default]
    Bytes,
    /// `git diff --no-index --quiet`.
    Git,
}

/// `[compare]` table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CompareSettings {
    /// Comparator to use.
    pub method: CompareMethod,
}

/// Contents of `dotlayers.toml`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Settings {
    /// Content comparison.
    pub compare: CompareSettings,
    /// Hook toggles.
    pub hooks: HookSettings,
}

impl Settings {
    /// Build the configured comparator.
    ///
    /// Falls back to [`ByteComparator`] with a warning when `git` is
    /// requested but not on `PATH`.
    #[must_use]
    pub fn comparator(
        &self,
        executor: &Arc<dyn Executor>,
        log: &dyn Log,
    ) -> Arc<dyn ContentComparator> {
        match self.compare.method {
            CompareMethod::Bytes => Arc::new(ByteComparator),
            CompareMethod::Git if executor.which("git") => {
                Arc::new(GitDiffComparator::new(Arc::clone(executor)))
            }
            CompareMethod::Git => {
                log.warn("git not found on PATH, comparing bytes instead");
                Arc::new(ByteComparator)
            }
        }
    }
}

/// Resolved installation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the layers.
    pub root: PathBuf,
    /// Directory targets are linked into.
    pub home: PathBuf,
    /// Settings read from the root.
    pub settings: Settings,
}

impl Config {
    /// Resolve root and home, then read `<root>/dotlayers.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root does not exist, the home directory is
    /// unknown, or the settings file is unreadable or invalid.
    pub fn load(root: Option<&Path>, home: Option<&Path>) -> Result<Self, ConfigError> {
        let root = paths::resolve_root(root)?;
        let home = paths::resolve_home(home)?;
        let settings = toml_loader::load_config(&root.join(paths::CONFIG_FILE))?;
        Ok(Self {
            root,
            home,
            settings,
        })
    }
}
