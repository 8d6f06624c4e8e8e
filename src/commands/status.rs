//! Status command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::logging::Logger;

/// Print the status report for every layer.
///
/// # Errors
///
/// Returns an error if the root, home or layers cannot be resolved.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let report = setup.inventory.report(&setup.ctx);
    if !report.is_empty() {
        log.info(&report);
    }
    Ok(())
}
