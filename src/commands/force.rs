//! `force-out` and `force-in` command implementations.
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::cli::{GlobalOpts, NodeOpts};
use crate::engine::Context;
use crate::engine::inventory::Inventory;
use crate::engine::status::Operation;
use crate::error::EngineError;
use crate::logging::Logger;

/// Which side wins when forcing a conflicted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The layer's copy replaces the home file (`force-out`).
    Out,
    /// The home file replaces the layer's copy (`force-in`).
    In,
}

impl Direction {
    const fn operation(self) -> Operation {
        match self {
            Self::Out => Operation::ForceOut,
            Self::In => Operation::ForceIn,
        }
    }
}

/// Run `force-out` or `force-in`.
///
/// # Errors
///
/// Returns an error if setup fails, an argument is missing, the layer or
/// path is unknown, or the operation fails.
pub fn run(
    global: &GlobalOpts,
    opts: &NodeOpts,
    direction: Direction,
    log: &Arc<Logger>,
) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    apply(
        &setup.inventory,
        &setup.ctx,
        direction,
        opts.layer.as_deref(),
        opts.path.as_deref(),
    )?;
    super::finish(log)
}

/// Resolve the node for `layer` and `path` and force it in `direction`.
///
/// # Errors
///
/// Returns an error if an argument is missing or the node cannot be found.
/// Operation failures are recorded, not returned.
pub fn apply(
    inventory: &Inventory,
    ctx: &Context,
    direction: Direction,
    layer: Option<&str>,
    path: Option<&Path>,
) -> Result<()> {
    let layer = inventory.resolve(layer)?;
    let path = path.ok_or(EngineError::MissingArgument("path"))?;
    let node = inventory.node(layer, path)?;

    let outcome = match direction {
        Direction::Out => node.force_out(ctx),
        Direction::In => node.force_in(ctx),
    };
    super::record_outcome(
        ctx.log.as_ref(),
        &format!(
            "{} {}/{}",
            direction.operation(),
            layer.name(),
            node.rel_path().display()
        ),
        outcome.map(Into::into),
    );
    Ok(())
}
