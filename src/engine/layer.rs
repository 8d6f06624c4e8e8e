//! A layer: one directory of home-mirroring files plus lifecycle hooks.
//!
//! ```text
//! <root>/<layer>/home/...      mirrors $HOME, one node per regular file
//! <root>/<layer>/merge/...     hooks run after a merge
//! <root>/<layer>/unmerge/...   hooks run after an unmerge
//! ```
use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::walk;

use super::Context;
use super::fs;
use super::node::NodeRef;
use super::registry::{FileId, FileRegistry};
use super::status::{Change, Operation, Status};

/// Index of a [`Layer`] in discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(usize);

impl LayerId {
    /// Wrap a discovery index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Discovery index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Result of a layer-level merge or unmerge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerReport {
    /// What happened to the layer's nodes.
    pub change: Change,
    /// Hooks that exited non-zero or failed to start.
    pub failed_hooks: usize,
}

impl LayerReport {
    const fn unchanged() -> Self {
        Self::from_change(Change::AlreadyCorrect)
    }

    const fn from_change(change: Change) -> Self {
        Self {
            change,
            failed_hooks: 0,
        }
    }
}

impl From<Change> for LayerReport {
    fn from(change: Change) -> Self {
        Self::from_change(change)
    }
}

/// A named bundle of tracked files and hooks.
#[derive(Debug)]
pub struct Layer {
    id: LayerId,
    name: String,
    root: PathBuf,
    files: Vec<FileId>,
    merge_hooks: Vec<PathBuf>,
    unmerge_hooks: Vec<PathBuf>,
}

/// Fold node statuses into a layer status.
///
/// `Missing` and `Conflicted` both collapse to `Missing`; the first of those
/// or an `Owned` node short-circuits. Otherwise `Identical` beats
/// `Symlinked`.
fn aggregate(statuses: impl IntoIterator<Item = Status>) -> Status {
    let mut result = Status::Symlinked;
    for status in statuses {
        match status {
            Status::Missing | Status::Conflicted => return Status::Missing,
            Status::Owned => return Status::Owned,
            Status::Identical => result = Status::Identical,
            Status::Symlinked => {}
        }
    }
    result
}

impl Layer {
    /// Enumerate the layer directory at `root`, binding every file under
    /// `home/` into `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if a subtree cannot be walked.
    pub fn scan(id: LayerId, root: &Path, registry: &mut FileRegistry) -> Result<Self, EngineError> {
        let name = root
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());

        let home = root.join("home");
        let mut files = Vec::new();
        for rel in walk::list_files(&home)? {
            if fs::is_staging_file(&rel) {
                continue;
            }
            let file = registry.bind(&rel, id, home.join(&rel));
            if !files.contains(&file) {
                files.push(file);
            }
        }

        let hooks = |dir: &str| -> Result<Vec<PathBuf>, EngineError> {
            let dir = root.join(dir);
            Ok(walk::list_files(&dir)?
                .into_iter()
                .map(|rel| dir.join(rel))
                .collect())
        };

        Ok(Self {
            id,
            name,
            root: root.to_path_buf(),
            files,
            merge_hooks: hooks("merge")?,
            unmerge_hooks: hooks("unmerge")?,
        })
    }

    /// Discovery index.
    #[must_use]
    pub const fn id(&self) -> LayerId {
        self.id
    }

    /// Directory name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Layer directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Hooks run after a merge, in discovery order.
    #[must_use]
    pub fn merge_hooks(&self) -> &[PathBuf] {
        &self.merge_hooks
    }

    /// Hooks run after an unmerge, in discovery order.
    #[must_use]
    pub fn unmerge_hooks(&self) -> &[PathBuf] {
        &self.unmerge_hooks
    }

    /// This layer's nodes, in enumeration order.
    pub fn nodes<'r>(&'r self, registry: &'r FileRegistry) -> impl Iterator<Item = NodeRef<'r>> + 'r {
        self.files
            .iter()
            .filter_map(|id| registry.get(*id))
            .filter_map(|file| file.node(self.id))
    }

    /// Aggregate status of every node.
    #[must_use]
    pub fn status(&self, registry: &FileRegistry, ctx: &Context) -> Status {
        aggregate(self.nodes(registry).map(|node| node.status(ctx)))
    }

    /// Check that every node accepts `operation` and return the node
    /// statuses, without touching the filesystem.
    fn preflight(
        &self,
        operation: Operation,
        registry: &FileRegistry,
        ctx: &Context,
    ) -> Result<Vec<Status>, EngineError> {
        let mut statuses = Vec::new();
        for node in self.nodes(registry) {
            let status = node.status(ctx);
            if !status.is_mergeable() {
                return Err(EngineError::UnsupportedTransition {
                    operation,
                    subject: format!("{}/{}", self.name, node.rel_path().display()),
                    status,
                });
            }
            statuses.push(status);
        }
        Ok(statuses)
    }

    /// Link every node, then run the merge hooks.
    ///
    /// A layer that is already fully symlinked is left alone and its hooks
    /// are not run.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnsupportedTransition`] if any node is `Owned`
    /// or `Conflicted` (nothing is changed), or an I/O error from a node.
    pub fn merge(&self, registry: &FileRegistry, ctx: &Context) -> Result<LayerReport, EngineError> {
        let statuses = self.preflight(Operation::Merge, registry, ctx)?;
        if aggregate(statuses) == Status::Symlinked {
            ctx.log.debug(&format!("{} is already merged", self.name));
            return Ok(LayerReport::unchanged());
        }

        ctx.log.stage(&format!("Merging {}...", self.name));
        for node in self.nodes(registry) {
            node.merge(ctx)?;
        }

        let failed_hooks = if ctx.hooks.merge {
            self.run_hooks(&self.merge_hooks, ctx)
        } else {
            0
        };
        Ok(LayerReport {
            change: Change::Applied,
            failed_hooks,
        })
    }

    /// Remove every node's target, then run the unmerge hooks.
    ///
    /// A layer that reports `Missing` is left alone, including one that is
    /// only partly merged or holds a conflicted node.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnsupportedTransition`] if the layer is `Owned`
    /// (nothing is changed), or an I/O error from a node.
    pub fn unmerge(
        &self,
        registry: &FileRegistry,
        ctx: &Context,
    ) -> Result<LayerReport, EngineError> {
        if self.status(registry, ctx) == Status::Missing {
            ctx.log.debug(&format!("{} is not merged", self.name));
            return Ok(LayerReport::unchanged());
        }
        self.preflight(Operation::Unmerge, registry, ctx)?;

        ctx.log.stage(&format!("Unmerging {}...", self.name));
        for node in self.nodes(registry) {
            node.unmerge(ctx)?;
        }

        let failed_hooks = if ctx.hooks.unmerge {
            self.run_hooks(&self.unmerge_hooks, ctx)
        } else {
            0
        };
        Ok(LayerReport {
            change: Change::Applied,
            failed_hooks,
        })
    }

    /// Run `hooks` in order from the layer directory, attached to the
    /// terminal. Failures are logged and counted; the remaining hooks still
    /// run.
    fn run_hooks(&self, hooks: &[PathBuf], ctx: &Context) -> usize {
        let mut failed = 0;
        for hook in hooks {
            ctx.log
                .info(&format!("Executing hook {}...", hook.display()));
            if let Err(e) = ctx
                .executor
                .run_attached(&self.root, &hook.to_string_lossy(), &[])
            {
                let err = EngineError::HookFailed {
                    hook: hook.display().to_string(),
                    reason: format!("{e:#}"),
                };
                ctx.log.warn(&err.to_string());
                failed += 1;
            }
        }
        failed
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::engine::test_helpers::{Fixture, MockExecutor};

    #[test]
    fn aggregate_short_circuits_on_missing_or_conflicted() {
        use Status::{Conflicted, Identical, Missing, Owned, Symlinked};
        assert_eq!(aggregate([Symlinked, Symlinked]), Symlinked);
        assert_eq!(aggregate([Symlinked, Identical]), Identical);
        assert_eq!(aggregate([Identical, Missing]), Missing);
        assert_eq!(aggregate([Conflicted, Owned]), Missing);
        assert_eq!(aggregate([Owned, Conflicted]), Owned);
        assert_eq!(aggregate([]), Symlinked);
    }

    #[test]
    fn scan_collects_files_and_hooks_in_order() {
        let fx = Fixture::new()
            .layer_file("zsh", ".zshrc", "x")
            .layer_file("zsh", ".config/zsh/aliases.zsh", "y")
            .hook("zsh", "merge", "20-second")
            .hook("zsh", "merge", "10-first")
            .hook("zsh", "unmerge", "cleanup");
        let inv = fx.inventory();
        let layer = inv.find("zsh").unwrap();

        let rels: Vec<_> = layer
            .nodes(inv.registry())
            .map(|n| n.rel_path().to_path_buf())
            .collect();
        assert_eq!(
            rels,
            vec![
                PathBuf::from(".config/zsh/aliases.zsh"),
                PathBuf::from(".zshrc")
            ]
        );
        let names: Vec<_> = layer
            .merge_hooks()
            .iter()
            .map(|h| h.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["10-first", "20-second"]);
        assert_eq!(layer.unmerge_hooks().len(), 1);
    }

    #[test]
    fn scan_skips_leftover_staging_files() {
        let fx = Fixture::new()
            .layer_file("app", ".config/app/config.toml", "a = 1")
            .layer_file("app", ".config/app/.config.toml.dotlayers_tmp", "a = 2");
        let inv = fx.inventory();
        let rels: Vec<_> = inv
            .find("app")
            .unwrap()
            .nodes(inv.registry())
            .map(|n| n.rel_path().to_path_buf())
            .collect();
        assert_eq!(rels, vec![PathBuf::from(".config/app/config.toml")]);
    }

    #[test]
    fn layer_without_hook_dirs_scans() {
        let fx = Fixture::new().layer_file("git", ".gitconfig", "[user]");
        let inv = fx.inventory();
        let layer = inv.find("git").unwrap();
        assert!(layer.merge_hooks().is_empty());
        assert!(layer.unmerge_hooks().is_empty());
    }

    #[test]
    fn missing_and_identical_nodes_aggregate_to_missing() {
        let fx = Fixture::new()
            .layer_file("vim", ".vimrc", "set nu")
            .layer_file("vim", ".gvimrc", "set go=")
            .home_file(".gvimrc", "set go=");
        let inv = fx.inventory();
        let ctx = fx.context();
        assert_eq!(
            inv.find("vim").unwrap().status(inv.registry(), &ctx),
            Status::Missing
        );
    }

    #[test]
    fn identical_layer_aggregates_to_identical() {
        let fx = Fixture::new()
            .layer_file("vim", ".vimrc", "set nu")
            .home_file(".vimrc", "set nu");
        let inv = fx.inventory();
        let ctx = fx.context();
        assert_eq!(
            inv.find("vim").unwrap().status(inv.registry(), &ctx),
            Status::Identical
        );
    }

    #[test]
    fn merge_links_every_node_and_runs_hooks() {
        let fx = Fixture::new()
            .layer_file("vim", ".vimrc", "set nu")
            .layer_file("vim", ".vim/colors/dark.vim", "hi")
            .hook("vim", "merge", "install-plugins");
        let inv = fx.inventory();
        let ctx = fx.context();
        let layer = inv.find("vim").unwrap();

        let report = layer.merge(inv.registry(), &ctx).unwrap();
        assert_eq!(report.change, Change::Applied);
        assert_eq!(report.failed_hooks, 0);
        assert_eq!(layer.status(inv.registry(), &ctx), Status::Symlinked);

        let calls = fx.executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, layer.root());
        assert!(calls[0].1.ends_with("install-plugins"));
    }

    #[test]
    fn merge_of_merged_layer_is_noop_without_hooks() {
        let fx = Fixture::new()
            .layer_file("vim", ".vimrc", "set nu")
            .hook("vim", "merge", "install-plugins");
        let inv = fx.inventory();
        let ctx = fx.context();
        let layer = inv.find("vim").unwrap();

        layer.merge(inv.registry(), &ctx).unwrap();
        let again = layer.merge(inv.registry(), &ctx).unwrap();
        assert_eq!(again.change, Change::AlreadyCorrect);
        assert_eq!(fx.executor.calls().len(), 1);
    }

    #[test]
    fn hook_failure_is_counted_and_remaining_hooks_run() {
        let fx = Fixture::new()
            .layer_file("vim", ".vimrc", "set nu")
            .hook("vim", "merge", "a")
            .hook("vim", "merge", "b")
            .with_executor(MockExecutor::with_codes(vec![1, 0]));
        let inv = fx.inventory();
        let ctx = fx.context();
        let layer = inv.find("vim").unwrap();

        let report = layer.merge(inv.registry(), &ctx).unwrap();
        assert_eq!(report.failed_hooks, 1);
        assert_eq!(fx.executor.calls().len(), 2);
        assert!(fx.log.warnings()[0].contains("hook"));
        assert_eq!(layer.status(inv.registry(), &ctx), Status::Symlinked);
    }

    #[test]
    fn disabled_hooks_are_skipped() {
        let fx = Fixture::new()
            .layer_file("vim", ".vimrc", "set nu")
            .hook("vim", "merge", "a")
            .hook("vim", "unmerge", "b");
        let inv = fx.inventory();
        let mut ctx = fx.context();
        ctx.hooks.merge = false;
        ctx.hooks.unmerge = false;
        let layer = inv.find("vim").unwrap();

        layer.merge(inv.registry(), &ctx).unwrap();
        layer.unmerge(inv.registry(), &ctx).unwrap();
        assert!(fx.executor.calls().is_empty());
    }

    #[test]
    fn unmerge_removes_targets_and_runs_unmerge_hooks() {
        let fx = Fixture::new()
            .layer_file("vim", ".vimrc", "set nu")
            .hook("vim", "unmerge", "cleanup");
        let inv = fx.inventory();
        let ctx = fx.context();
        let layer = inv.find("vim").unwrap();

        layer.merge(inv.registry(), &ctx).unwrap();
        let report = layer.unmerge(inv.registry(), &ctx).unwrap();
        assert_eq!(report.change, Change::Applied);
        assert_eq!(layer.status(inv.registry(), &ctx), Status::Missing);
        assert!(!fx.home_path(".vimrc").exists());

        let calls = fx.executor.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1.ends_with("cleanup"));
    }

    #[test]
    fn unmerge_of_partially_merged_layer_is_noop() {
        let fx = Fixture::new()
            .layer_file("vim", ".vimrc", "set nu")
            .layer_file("vim", ".gvimrc", "set go=")
            .home_file(".gvimrc", "set go=")
            .hook("vim", "unmerge", "cleanup");
        let inv = fx.inventory();
        let ctx = fx.context();
        let layer = inv.find("vim").unwrap();
        assert_eq!(layer.status(inv.registry(), &ctx), Status::Missing);

        let report = layer.unmerge(inv.registry(), &ctx).unwrap();
        assert_eq!(report.change, Change::AlreadyCorrect);
        assert_eq!(fx.read_home(".gvimrc"), "set go=");
        assert!(fx.executor.calls().is_empty());
    }

    #[test]
    fn unmerge_with_conflicted_node_is_noop() {
        let fx = Fixture::new()
            .layer_file("vim", ".gvimrc", "set go=")
            .layer_file("vim", ".vimrc", "set nu")
            .link_home(".gvimrc", "vim")
            .home_file(".vimrc", "local edits");
        let inv = fx.inventory();
        let ctx = fx.context();
        let layer = inv.find("vim").unwrap();
        assert_eq!(layer.status(inv.registry(), &ctx), Status::Missing);

        let report = layer.unmerge(inv.registry(), &ctx).unwrap();
        assert_eq!(report.change, Change::AlreadyCorrect);
        assert!(fx
            .home_path(".gvimrc")
            .symlink_metadata()
            .is_ok_and(|m| m.is_symlink()));
        assert_eq!(fx.read_home(".vimrc"), "local edits");
    }

    #[test]
    fn unmerge_of_absent_layer_is_noop() {
        let fx = Fixture::new()
            .layer_file("vim", ".vimrc", "set nu")
            .hook("vim", "unmerge", "cleanup");
        let inv = fx.inventory();
        let ctx = fx.context();
        let report = inv.find("vim").unwrap().unmerge(inv.registry(), &ctx).unwrap();
        assert_eq!(report.change, Change::AlreadyCorrect);
        assert!(fx.executor.calls().is_empty());
    }

    #[test]
    fn conflicted_node_blocks_whole_layer_before_mutation() {
        let fx = Fixture::new()
            .layer_file("vim", ".gvimrc", "set go=")
            .layer_file("vim", ".vimrc", "set nu")
            .home_file(".vimrc", "local edits")
            .hook("vim", "merge", "a");
        let inv = fx.inventory();
        let ctx = fx.context();
        let layer = inv.find("vim").unwrap();

        let err = layer.merge(inv.registry(), &ctx).unwrap_err();
        assert!(matches!(
            err,
            EngineError::UnsupportedTransition {
                status: Status::Conflicted,
                ..
            }
        ));
        assert!(err.to_string().contains("vim/.vimrc"));
        assert!(fx.home_path(".gvimrc").symlink_metadata().is_err());
        assert!(fx.executor.calls().is_empty());
    }

    #[test]
    fn layer_owned_by_sibling_rejects_merge() {
        let fx = Fixture::new()
            .layer_file("base", ".zshrc", "base")
            .layer_file("work", ".zshrc", "work");
        let inv = fx.inventory();
        let ctx = fx.context();
        let (base, work) = (inv.find("base").unwrap(), inv.find("work").unwrap());

        base.merge(inv.registry(), &ctx).unwrap();
        assert_eq!(work.status(inv.registry(), &ctx), Status::Owned);
        assert!(work.merge(inv.registry(), &ctx).is_err());
        assert!(work.unmerge(inv.registry(), &ctx).is_err());
        assert_eq!(fx.read_home(".zshrc"), "base");
    }
}
