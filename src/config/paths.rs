//! Installation root and home directory resolution.
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Environment variable naming the installation root.
pub const ROOT_ENV: &str = "DOTLAYERS_ROOT";

/// Settings file looked up at the installation root.
pub const CONFIG_FILE: &str = "dotlayers.toml";

/// Choose the root candidate: flag, then environment, then the executable's
/// directory when it holds a settings file, then the working directory.
fn pick_root(
    flag: Option<&Path>,
    env: Option<OsString>,
    exe_dir: Option<PathBuf>,
    cwd: PathBuf,
) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
        .or_else(|| exe_dir.filter(|dir| dir.join(CONFIG_FILE).is_file()))
        .unwrap_or(cwd)
}

fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()?
        .parent()
        .map(Path::to_path_buf)
}

/// Resolve and canonicalize the installation root.
///
/// The root is made absolute so that symlinks created in the home directory
/// point at stable absolute sources.
///
/// # Errors
///
/// Returns [`ConfigError::RootNotFound`] if the chosen directory does not
/// exist.
pub fn resolve_root(flag: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let candidate = pick_root(flag, std::env::var_os(ROOT_ENV), exe_dir(), cwd);
    match dunce::canonicalize(&candidate) {
        Ok(root) if root.is_dir() => Ok(root),
        _ => Err(ConfigError::RootNotFound(candidate.display().to_string())),
    }
}

/// Choose the home directory from the flag or the platform's variables,
/// in order of preference.
fn pick_home(flag: Option<&Path>, vars: &[Option<OsString>]) -> Option<PathBuf> {
    flag.map(Path::to_path_buf).or_else(|| {
        vars.iter()
            .flatten()
            .find(|v| !v.is_empty())
            .map(PathBuf::from)
    })
}

/// Resolve the home directory targets are linked into.
///
/// # Errors
///
/// Returns [`ConfigError::MissingHome`] if no flag is given and neither
/// `HOME` nor (on Windows) `USERPROFILE` is set.
pub fn resolve_home(flag: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let vars = if cfg!(target_os = "windows") {
        [std::env::var_os("USERPROFILE"), std::env::var_os("HOME")]
    } else {
        [std::env::var_os("HOME"), None]
    };
    let home = pick_home(flag, &vars).ok_or(ConfigError::MissingHome)?;
    Ok(dunce::canonicalize(&home).unwrap_or(home))
}
