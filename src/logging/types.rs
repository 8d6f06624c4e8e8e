//! Core logging types: operation entries, outcome status, and the [`Log`] trait.

/// Outcome of one layer-level operation, kept for the run summary.
#[derive(Debug, Clone)]
pub struct OpEntry {
    /// Human-readable operation label, e.g. `merge vim`.
    pub name: String,
    /// Final outcome.
    pub status: OpStatus,
    /// Optional detail message (e.g. failed hook count or error).
    pub message: Option<String>,
}

/// Outcome of a recorded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpStatus {
    /// The operation changed the filesystem.
    Ok,
    /// Nothing needed to change.
    Unchanged,
    /// The user declined a confirmation.
    Declined,
    /// The operation failed.
    Failed,
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) is the production implementation; tests
/// substitute a recording implementation to assert on emitted warnings.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record an operation outcome for the summary.
    fn record(&self, name: &str, status: OpStatus, message: Option<&str>);
}
