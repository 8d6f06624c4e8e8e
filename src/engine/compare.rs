//! Content equality between a layer source and its home target.
//!
//! Comparison never fails outward: any error while comparing is logged as a
//! warning and the pair is treated as different, which steers the node
//! towards [`Conflicted`](super::status::Status::Conflicted) instead of a
//! false claim.
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use crate::error::EngineError;
use crate::exec::Executor;
use crate::logging::Log;

const CHUNK: usize = 8 * 1024;

/// Decides whether two files have byte-identical content.
pub trait ContentComparator: Send + Sync + std::fmt::Debug {
    /// Returns `true` iff both paths exist and their contents are identical.
    ///
    /// Failures are reported through `log` and yield `false`.
    fn files_equal(&self, a: &Path, b: &Path, log: &dyn Log) -> bool;
}

fn warn_unavailable(log: &dyn Log, a: &Path, b: &Path, reason: String) {
    let err = EngineError::ComparisonUnavailable {
        left: a.display().to_string(),
        right: b.display().to_string(),
        reason,
    };
    log.warn(&err.to_string());
}

/// In-process comparator: length check, then chunked byte comparison.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByteComparator;

impl ByteComparator {
    fn compare(a: &Path, b: &Path) -> std::io::Result<bool> {
        let (meta_a, meta_b) = (std::fs::metadata(a)?, std::fs::metadata(b)?);
        if meta_a.len() != meta_b.len() {
            return Ok(false);
        }

        let mut ra = BufReader::new(File::open(a)?);
        let mut rb = BufReader::new(File::open(b)?);
        let mut buf_a = vec![0u8; CHUNK];
        let mut buf_b = vec![0u8; CHUNK];
        loop {
            let n = ra.read(&mut buf_a)?;
            if n == 0 {
                // Equal lengths were checked, so b must be exhausted too.
                return Ok(rb.read(&mut buf_b)? == 0);
            }
            let (Some(chunk_a), Some(chunk_b)) = (buf_a.get(..n), buf_b.get_mut(..n)) else {
                return Ok(false);
            };
            rb.read_exact(chunk_b)?;
            if chunk_a != chunk_b {
                return Ok(false);
            }
        }
    }
}

impl ContentComparator for ByteComparator {
    fn files_equal(&self, a: &Path, b: &Path, log: &dyn Log) -> bool {
        if !a.is_file() || !b.is_file() {
            return false;
        }
        Self::compare(a, b).unwrap_or_else(|e| {
            warn_unavailable(log, a, b, e.to_string());
            false
        })
    }
}

/// External diff oracle: `git diff --no-index --quiet a b`.
///
/// Exit code 0 means equal, 1 means different; anything else (or a failure
/// to start `git`) is treated as "not equal" with a warning.
#[derive(Debug, Clone)]
pub struct GitDiffComparator {
    executor: Arc<dyn Executor>,
}

impl GitDiffComparator {
    /// Create a comparator that runs `git` through `executor`.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }
}

impl ContentComparator for GitDiffComparator {
    fn files_equal(&self, a: &Path, b: &Path, log: &dyn Log) -> bool {
        if !a.is_file() || !b.is_file() {
            return false;
        }
        let (a_str, b_str) = (a.to_string_lossy(), b.to_string_lossy());
        match self
            .executor
            .run_unchecked("git", &["diff", "--no-index", "--quiet", &a_str, &b_str])
        {
            Ok(result) => match result.code {
                Some(0) => true,
                Some(1) => false,
                code => {
                    let reason = format!(
                        "git diff exited with {}: {}",
                        code.map_or_else(|| "signal".to_string(), |c| c.to_string()),
                        result.stderr.trim()
                    );
                    warn_unavailable(log, a, b, reason);
                    false
                }
            },
            Err(e) => {
                warn_unavailable(log, a, b, format!("{e:#}"));
                false
            }
        }
    }
}
