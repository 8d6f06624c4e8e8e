//! Command-line surface parsed with clap.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI entry point for the layered dotfile manager.
#[derive(Parser, Debug)]
#[command(
    name = "dotlayers",
    about = "Symlink configuration layers into the home directory",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Directory holding the layers (default: $DOTLAYERS_ROOT, then the
    /// executable's directory, then the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Directory layers are linked into (default: $HOME)
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    pub yes: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the status of every layer and tracked file
    Status,
    /// Turn identical copies into symlinks for every fully identical layer
    Doctor(DoctorOpts),
    /// Link a layer's files into the home directory
    Merge(LayerOpts),
    /// Remove a layer's files from the home directory
    Unmerge(LayerOpts),
    /// Discard local edits to a file in favour of the layer's copy
    ForceOut(NodeOpts),
    /// Adopt local edits to a file into the layer
    ForceIn(NodeOpts),
    /// Print version information
    Version,
}

/// Options for `doctor`.
#[derive(Parser, Debug, Clone)]
pub struct DoctorOpts {
    /// Ignored
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    pub rest: Vec<String>,
}

/// Options for `merge` and `unmerge`.
#[derive(Parser, Debug, Clone)]
pub struct LayerOpts {
    /// Layer name
    pub layer: Option<String>,
}

/// Options for `force-out` and `force-in`.
#[derive(Parser, Debug, Clone)]
pub struct NodeOpts {
    /// Layer name
    pub layer: Option<String>,

    /// File path, relative to home or absolute inside it
    pub path: Option<PathBuf>,
}

impl Command {
    /// Subcommand name, used to name the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Doctor(_) => "doctor",
            Self::Merge(_) => "merge",
            Self::Unmerge(_) => "unmerge",
            Self::ForceOut(_) => "force-out",
            Self::ForceIn(_) => "force-in",
            Self::Version => "version",
        }
    }
}
