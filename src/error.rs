//! Domain-specific error types for the layer engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! The engine returns typed errors ([`EngineError`], [`ConfigError`]). Command
//! setup folds both into [`DotlayersError`], and command handlers at the CLI
//! boundary convert to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! DotlayersError
//! ├── Engine(EngineError): status transitions, layer lookup, filesystem
//! └── Config(ConfigError): root/home resolution, dotlayers.toml
//! ```
//!
//! [`EngineError::ComparisonUnavailable`] and [`EngineError::HookFailed`] are
//! recovered where they occur: they are rendered into warnings and never
//! returned to the caller.

use std::path::Path;

use thiserror::Error;

use crate::engine::status::{Operation, Status};

/// Top-level error type for the layer manager.
#[derive(Error, Debug)]
pub enum DotlayersError {
    /// Engine error (transition guard, lookup, filesystem).
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Configuration error (root, home, config file).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by the status-resolution engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A mutation was invoked from a status outside its allowed set.
    #[error("cannot {operation} {subject}: status is {status}")]
    UnsupportedTransition {
        /// The rejected operation.
        operation: Operation,
        /// Node path or layer name the operation was invoked on.
        subject: String,
        /// Status observed when the guard ran.
        status: Status,
    },

    /// No discovered layer carries the requested name.
    #[error("Layer not found: {0}")]
    NameNotFound(String),

    /// A command that needs an argument was not given one.
    #[error("Missing {0}")]
    MissingArgument(&'static str),

    /// The layer does not provide the requested home-relative path.
    #[error("{path} is not tracked by layer {layer}")]
    NotTracked {
        /// Layer name.
        layer: String,
        /// Home-relative path that was requested.
        path: String,
    },

    /// The content comparator could not run.
    #[error("could not compare {left} with {right}: {reason}")]
    ComparisonUnavailable {
        /// First compared path.
        left: String,
        /// Second compared path.
        right: String,
        /// Why the comparison failed.
        reason: String,
    },

    /// A merge or unmerge hook exited non-zero or failed to start.
    #[error("hook {hook} failed: {reason}")]
    HookFailed {
        /// Hook path.
        hook: String,
        /// Underlying failure.
        reason: String,
    },

    /// A filesystem operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path the operation was acting on.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl EngineError {
    /// Build a closure that wraps an [`std::io::Error`] with `path`.
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Errors that arise while resolving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `dotlayers.toml` is not valid TOML or has unknown keys.
    #[error("Invalid config syntax in {file}: {message}")]
    InvalidSyntax {
        /// Config file path.
        file: String,
        /// Parser message.
        message: String,
    },

    /// An I/O error occurred while reading a config file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Neither `--home` nor the home environment variable is available.
    #[error("cannot determine home directory: use --home or set HOME")]
    MissingHome,

    /// The layer root directory does not exist.
    #[error("layer root does not exist: {0}")]
    RootNotFound(String),
}
