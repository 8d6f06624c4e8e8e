//! Command handlers behind the CLI subcommands.
//!
//! Each handler builds a [`CommandSetup`], runs its layer operations, records
//! one outcome per operation and finishes with the run summary.
pub mod doctor;
pub mod force;
pub mod layer;
pub mod status;
pub mod version;

use anyhow::Result;
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::engine::Context;
use crate::engine::inventory::Inventory;
use crate::engine::layer::LayerReport;
use crate::engine::prompt::{AssumeYes, Prompt, TerminalPrompt};
use crate::engine::status::Change;
use crate::error::{DotlayersError, EngineError};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger, OpStatus};

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates configuration loading, collaborator wiring, and layer
/// discovery so that each command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Discovered layers and their tracked files.
    pub inventory: Inventory,
    /// Collaborators handed to every engine operation.
    pub ctx: Context,
}

impl CommandSetup {
    /// Resolve the installation, build the engine context, and scan layers.
    ///
    /// # Errors
    ///
    /// Returns an error if the root or home cannot be resolved, the settings
    /// file is invalid, or a layer directory cannot be read.
    pub fn init(global: &GlobalOpts, log: &Arc<Logger>) -> Result<Self, DotlayersError> {
        let config = Config::load(global.root.as_deref(), global.home.as_deref())?;
        log.debug(&format!("root: {}", config.root.display()));
        log.debug(&format!("home: {}", config.home.display()));

        let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
        let comparator = config.settings.comparator(&executor, log.as_ref());
        let prompt: Arc<dyn Prompt> = if global.yes {
            Arc::new(AssumeYes)
        } else {
            Arc::new(TerminalPrompt)
        };
        let ctx = Context::new(comparator, prompt, executor, Arc::clone(log) as Arc<dyn Log>)
            .with_hooks(config.settings.hooks);

        let inventory = Inventory::scan(&config.root, &config.home)?;
        log.debug(&format!(
            "{} layers, {} tracked files",
            inventory.layers().len(),
            inventory.registry().len()
        ));

        Ok(Self { inventory, ctx })
    }
}

/// Record the outcome of one operation for the run summary.
///
/// Errors are logged and recorded as failures rather than returned, so a
/// command can report every operation before deciding its exit status.
pub fn record_outcome(log: &dyn Log, label: &str, outcome: Result<LayerReport, EngineError>) {
    match outcome {
        Ok(report) => {
            let status = match report.change {
                Change::Applied => OpStatus::Ok,
                Change::AlreadyCorrect => OpStatus::Unchanged,
                Change::Declined => OpStatus::Declined,
            };
            let message = (report.failed_hooks > 0)
                .then(|| format!("{} hook(s) failed", report.failed_hooks));
            log.record(label, status, message.as_deref());
        }
        Err(e) => {
            log.error(&format!("{label}: {e}"));
            log.record(label, OpStatus::Failed, Some(&e.to_string()));
        }
    }
}

/// Print the summary and bail if any operation failed.
///
/// # Errors
///
/// Returns an error if one or more operations recorded a failure.
pub fn finish(log: &Logger) -> Result<()> {
    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} operation(s) failed");
    }
    Ok(())
}
