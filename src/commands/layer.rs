//! `merge` and `unmerge` command implementations.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{GlobalOpts, LayerOpts};
use crate::engine::Context;
use crate::engine::inventory::Inventory;
use crate::logging::Logger;

/// Run the merge command.
///
/// # Errors
///
/// Returns an error if setup fails, the layer is missing or unknown, or the
/// merge fails.
pub fn run_merge(global: &GlobalOpts, opts: &LayerOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    merge(&setup.inventory, &setup.ctx, opts.layer.as_deref())?;
    super::finish(log)
}

/// Run the unmerge command.
///
/// # Errors
///
/// Returns an error if setup fails, the layer is missing or unknown, or the
/// unmerge fails.
pub fn run_unmerge(global: &GlobalOpts, opts: &LayerOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    unmerge(&setup.inventory, &setup.ctx, opts.layer.as_deref())?;
    super::finish(log)
}

/// Merge the named layer and record the outcome.
///
/// # Errors
///
/// Returns an error if `name` is `None` or names no layer. Merge failures
/// are recorded, not returned.
pub fn merge(inventory: &Inventory, ctx: &Context, name: Option<&str>) -> Result<()> {
    let layer = inventory.resolve(name)?;
    let outcome = layer.merge(inventory.registry(), ctx);
    super::record_outcome(ctx.log.as_ref(), &format!("merge {}", layer.name()), outcome);
    Ok(())
}

/// Unmerge the named layer and record the outcome.
///
/// # Errors
///
/// Returns an error if `name` is `None` or names no layer. Unmerge failures
/// are recorded, not returned.
pub fn unmerge(inventory: &Inventory, ctx: &Context, name: Option<&str>) -> Result<()> {
    let layer = inventory.resolve(name)?;
    let outcome = layer.unmerge(inventory.registry(), ctx);
    super::record_outcome(
        ctx.log.as_ref(),
        &format!("unmerge {}", layer.name()),
        outcome,
    );
    Ok(())
}
