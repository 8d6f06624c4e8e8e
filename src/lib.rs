//! Layered dotfile manager.
//!
//! Configuration lives in *layers*: directories under an installation root,
//! each mirroring part of the home directory under `home/`. Merging a layer
//! replaces its home-directory targets with symlinks to the layer's copies;
//! unmerging removes them. Several layers may provide the same path, and
//! every status is derived from the filesystem on demand.
//!
//! - **[`engine`]**: tracked files, nodes, layers and their state machine
//! - **[`config`]**: root/home resolution and `dotlayers.toml`
//! - **[`commands`]**: top-level subcommand orchestration
//! - **[`logging`]**: console and log-file output, operation summary
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod exec;
pub mod logging;
pub mod walk;
