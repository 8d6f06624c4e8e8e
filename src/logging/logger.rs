//! Structured logger with operation summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::STAGE_TARGET;
use super::types::{Log, OpEntry, OpStatus};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger backed by the global [`tracing`] subscriber.
///
/// All messages are always written to a persistent log file at
/// `$XDG_CACHE_HOME/dotlayers/<command>.log` (default
/// `~/.cache/dotlayers/<command>.log`) with timestamps and ANSI codes
/// stripped, regardless of the verbose flag.
#[derive(Debug)]
pub struct Logger {
    ops: Mutex<Vec<OpEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Stores the log file path for display in the run summary. The file
    /// itself is created by [`init_subscriber`](super::subscriber::init_subscriber).
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            ops: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded entries (test-only).
    #[cfg(test)]
    pub(crate) fn entries(&self) -> Vec<OpEntry> {
        self.ops.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Record an operation result for the summary.
    pub fn record(&self, name: &str, status: OpStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.ops.lock() {
            guard.push(OpEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the number of failed operations.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.ops.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|op| op.status == OpStatus::Failed)
                .count()
        })
    }

    /// Print the summary of all recorded operations.
    pub fn print_summary(&self) {
        let ops = match self.ops.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => return,
        };
        if ops.is_empty() {
            return;
        }

        self.stage("Summary");

        let mut ok = 0u32;
        let mut unchanged = 0u32;
        let mut declined = 0u32;
        let mut failed = 0u32;

        for op in &ops {
            let (icon, color) = match op.status {
                OpStatus::Ok => {
                    ok += 1;
                    ("✓", "\x1b[32m")
                }
                OpStatus::Unchanged => {
                    unchanged += 1;
                    ("·", "\x1b[2m")
                }
                OpStatus::Declined => {
                    declined += 1;
                    ("○", "\x1b[33m")
                }
                OpStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = op
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", op.name));
        }

        self.info(&format!(
            "\x1b[32m{ok} ok\x1b[0m, \x1b[2m{unchanged} unchanged\x1b[0m, \x1b[33m{declined} declined\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error);

    fn record(&self, name: &str, status: OpStatus, message: Option<&str>) {
        self.record(name, status, message);
    }
}
