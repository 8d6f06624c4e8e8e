//! Doctor command: replace identical copies with symlinks.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{DoctorOpts, GlobalOpts};
use crate::engine::Context;
use crate::engine::inventory::Inventory;
use crate::engine::status::Status;
use crate::logging::{Logger, OpStatus};

/// Run the doctor command. Extra arguments are ignored.
///
/// # Errors
///
/// Returns an error if setup fails or any layer merge fails.
pub fn run(global: &GlobalOpts, _opts: &DoctorOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    repair(&setup.inventory, &setup.ctx);
    super::finish(log)
}

/// Merge every layer whose files are all identical to (or already linked
/// from) the home directory. No confirmation is needed since no content
/// can be lost. Other layers are recorded as unchanged.
pub fn repair(inventory: &Inventory, ctx: &Context) {
    for layer in inventory.layers() {
        let label = format!("doctor {}", layer.name());
        let status = layer.status(inventory.registry(), ctx);
        if status == Status::Identical {
            super::record_outcome(
                ctx.log.as_ref(),
                &label,
                layer.merge(inventory.registry(), ctx),
            );
        } else {
            ctx.log.debug(&format!("{} is {status}, skipping", layer.name()));
            ctx.log
                .record(&label, OpStatus::Unchanged, Some(&status.to_string()));
        }
    }
}
