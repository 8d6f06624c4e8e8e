//! Binding of one tracked file to one layer.
//!
//! A node's status is never stored: every call inspects the target on disk.
//! Resolution order:
//!
//! 1. target is not a regular file (absent or dangling link) → `Missing`
//! 2. target is a symlink to this node's source → `Symlinked`
//! 3. target content equals the source → `Identical`, unless a sibling
//!    outranks it (a sibling is symlinked, or an earlier sibling is also
//!    identical), in which case → `Owned`
//! 4. some sibling is symlinked or identical → `Owned`
//! 5. otherwise → `Conflicted`
//!
//! Siblings are judged by their local claim (steps 2 and 3) only, so
//! evaluation never recurses back into the node that asked.
use std::path::{Path, PathBuf};

use crate::error::EngineError;

use super::Context;
use super::fs;
use super::layer::LayerId;
use super::registry::TrackedFile;
use super::status::{Change, Operation, Status};

/// A layer's copy of one tracked file.
#[derive(Debug, Clone)]
pub struct Node {
    layer: LayerId,
    source: PathBuf,
}

impl Node {
    pub(super) const fn new(layer: LayerId, source: PathBuf) -> Self {
        Self { layer, source }
    }

    /// Layer that supplies this node.
    #[must_use]
    pub const fn layer(&self) -> LayerId {
        self.layer
    }

    /// Path of the layer's copy.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// What a node can say about the target from disk facts alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Claim {
    None,
    Identical,
    Linked,
}

/// Borrowed view of a [`Node`] together with its [`TrackedFile`], giving
/// access to siblings.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    file: &'a TrackedFile,
    index: usize,
}

impl<'a> NodeRef<'a> {
    pub(super) const fn new(file: &'a TrackedFile, index: usize) -> Self {
        Self { file, index }
    }

    fn node(&self) -> Option<&'a Node> {
        self.file.raw_node(self.index)
    }

    /// Layer that supplies this node.
    #[must_use]
    pub fn layer(&self) -> Option<LayerId> {
        self.node().map(Node::layer)
    }

    /// Path of the layer's copy.
    #[must_use]
    pub fn source(&self) -> &'a Path {
        self.node().map_or_else(|| Path::new(""), |n| n.source.as_path())
    }

    /// Home-relative path.
    #[must_use]
    pub fn rel_path(&self) -> &'a Path {
        self.file.rel_path()
    }

    /// Absolute path in the home directory.
    #[must_use]
    pub fn target(&self) -> &'a Path {
        self.file.target()
    }

    fn siblings(&self) -> impl Iterator<Item = NodeRef<'a>> + '_ {
        self.file.nodes().filter(|n| n.index != self.index)
    }

    fn links_here(&self) -> bool {
        fs::link_destination(self.target()).is_some_and(|dest| fs::paths_equal(&dest, self.source()))
    }

    fn claim(&self, ctx: &Context) -> Claim {
        if self.links_here() {
            Claim::Linked
        } else if ctx
            .comparator
            .files_equal(self.source(), self.target(), ctx.log.as_ref())
        {
            Claim::Identical
        } else {
            Claim::None
        }
    }

    /// Compute the current status from the filesystem.
    #[must_use]
    pub fn status(&self, ctx: &Context) -> Status {
        if !self.target().is_file() {
            return Status::Missing;
        }
        match self.claim(ctx) {
            Claim::Linked => Status::Symlinked,
            Claim::Identical => {
                let outranked = self.siblings().any(|sibling| {
                    if sibling.index < self.index {
                        sibling.claim(ctx) != Claim::None
                    } else {
                        sibling.links_here()
                    }
                });
                if outranked {
                    Status::Owned
                } else {
                    Status::Identical
                }
            }
            Claim::None => {
                if self.siblings().any(|sibling| sibling.claim(ctx) != Claim::None) {
                    Status::Owned
                } else {
                    Status::Conflicted
                }
            }
        }
    }

    fn guard(
        &self,
        operation: Operation,
        ctx: &Context,
        allowed: fn(Status) -> bool,
    ) -> Result<Status, EngineError> {
        let status = self.status(ctx);
        if allowed(status) {
            Ok(status)
        } else {
            Err(EngineError::UnsupportedTransition {
                operation,
                subject: self.rel_path().display().to_string(),
                status,
            })
        }
    }

    /// Make the target a symlink to the source.
    ///
    /// Allowed from `Symlinked` (no-op), `Identical` and `Missing`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnsupportedTransition`] from `Owned` or
    /// `Conflicted` without touching the filesystem, or an I/O error.
    pub fn merge(&self, ctx: &Context) -> Result<Change, EngineError> {
        let status = self.guard(Operation::Merge, ctx, Status::is_mergeable)?;
        if status == Status::Symlinked {
            return Ok(Change::AlreadyCorrect);
        }

        self.unmerge(ctx)?;

        let target = self.target();
        fs::ensure_parent_dir(target)?;
        if fs::is_dangling_link(target) {
            ctx.log
                .debug(&format!("clearing dangling link {}", target.display()));
            fs::remove_existing(target)?;
        }

        ctx.log.info(&format!(
            "Symlinking {} -> {}",
            target.display(),
            self.source().display()
        ));
        fs::create_symlink(self.source(), target)?;
        Ok(Change::Applied)
    }

    /// Remove the target.
    ///
    /// Allowed from `Symlinked`, `Identical` and `Missing` (no-op).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnsupportedTransition`] from `Owned` or
    /// `Conflicted` without touching the filesystem, or an I/O error.
    pub fn unmerge(&self, ctx: &Context) -> Result<Change, EngineError> {
        let status = self.guard(Operation::Unmerge, ctx, Status::is_mergeable)?;
        if status == Status::Missing {
            return Ok(Change::AlreadyCorrect);
        }

        let target = self.target();
        ctx.log.info(&format!("Removing {}", target.display()));
        std::fs::remove_file(target).map_err(EngineError::io(target))?;
        Ok(Change::Applied)
    }

    /// Discard local edits: delete the conflicting target and link it to
    /// the layer's copy, after confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnsupportedTransition`] unless `Conflicted`,
    /// or an I/O error.
    pub fn force_out(&self, ctx: &Context) -> Result<Change, EngineError> {
        self.guard(Operation::ForceOut, ctx, |s| s == Status::Conflicted)?;

        let target = self.target();
        ctx.log
            .warn(&format!("Overwriting changes in {}", target.display()));
        if !ctx.prompt.confirm("Proceed?") {
            return Ok(Change::Declined);
        }

        ctx.log.info(&format!("Removing {}", target.display()));
        fs::remove_existing(target)?;
        self.merge(ctx)
    }

    /// Adopt local edits: overwrite the layer's copy with the target's
    /// current content (through a symlink if there is one), then link the
    /// target to it, after confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnsupportedTransition`] unless `Conflicted`,
    /// or an I/O error.
    pub fn force_in(&self, ctx: &Context) -> Result<Change, EngineError> {
        self.guard(Operation::ForceIn, ctx, |s| s == Status::Conflicted)?;

        let source = self.source();
        ctx.log
            .warn(&format!("Overwriting changes in {}", source.display()));
        if !ctx.prompt.confirm("Proceed?") {
            return Ok(Change::Declined);
        }

        ctx.log.info(&format!(
            "Copying {} -> {}",
            self.target().display(),
            source.display()
        ));
        fs::replace_with_copy(self.target(), source)?;
        self.merge(ctx)
    }
}
