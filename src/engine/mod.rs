//! Layered status resolution: tracked files, nodes, layers and their
//! merge/unmerge state machine.
//!
//! Nothing in this module caches filesystem state. Every status query reads
//! the home tree again, so an inventory stays correct while it mutates the
//! tree.

pub mod compare;
pub mod fs;
pub mod inventory;
pub mod layer;
pub mod node;
pub mod prompt;
pub mod registry;
pub mod status;

use serde::Deserialize;
use std::sync::Arc;

use crate::exec::Executor;
use crate::logging::Log;

use compare::ContentComparator;
use prompt::Prompt;

/// Which hook directories run after layer operations (`[hooks]` table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct HookSettings {
    /// Run `merge/` hooks after a layer merge.
    pub merge: bool,
    /// Run `unmerge/` hooks after a layer unmerge.
    pub unmerge: bool,
}

impl Default for HookSettings {
    fn default() -> Self {
        Self {
            merge: true,
            unmerge: true,
        }
    }
}

/// Collaborators injected into every node and layer operation.
pub struct Context {
    /// Content equality oracle.
    pub comparator: Arc<dyn ContentComparator>,
    /// Confirmation for destructive conflict resolution.
    pub prompt: Arc<dyn Prompt>,
    /// Process runner for hooks.
    pub executor: Arc<dyn Executor>,
    /// Logger for progress lines and warnings.
    pub log: Arc<dyn Log>,
    /// Hook toggles.
    pub hooks: HookSettings,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("comparator", &self.comparator)
            .field("prompt", &self.prompt)
            .field("executor", &self.executor)
            .field("log", &"<dyn Log>")
            .field("hooks", &self.hooks)
            .finish()
    }
}

impl Context {
    /// Create a context with default hook settings.
    #[must_use]
    pub fn new(
        comparator: Arc<dyn ContentComparator>,
        prompt: Arc<dyn Prompt>,
        executor: Arc<dyn Executor>,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            comparator,
            prompt,
            executor,
            log,
            hooks: HookSettings::default(),
        }
    }

    /// Replace the hook settings.
    #[must_use]
    pub const fn with_hooks(mut self, hooks: HookSettings) -> Self {
        self.hooks = hooks;
        self
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
pub(crate) mod test_helpers {
    use std::collections::VecDeque;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    use crate::exec::{ExecResult, Executor};
    use crate::logging::{Log, OpStatus};

    use super::Context;
    use super::compare::ByteComparator;
    use super::inventory::Inventory;
    use super::prompt::{AssumeYes, Prompt};

    /// Scripted executor that records every invocation.
    ///
    /// Each call pops the next exit code from the queue; an empty queue
    /// means success. [`failing`](Self::failing) makes every call fail to
    /// start.
    #[derive(Debug, Default)]
    pub struct MockExecutor {
        codes: Mutex<VecDeque<i32>>,
        spawn_error: bool,
        calls: Mutex<Vec<(PathBuf, String)>>,
    }

    impl MockExecutor {
        /// Respond with `codes` in order, then succeed.
        #[must_use]
        pub fn with_codes(codes: Vec<i32>) -> Self {
            Self {
                codes: Mutex::new(codes.into()),
                ..Self::default()
            }
        }

        /// Every call fails as if the program did not exist.
        #[must_use]
        pub fn failing() -> Self {
            Self {
                spawn_error: true,
                ..Self::default()
            }
        }

        /// Recorded `(working dir, program)` pairs; `run_unchecked` records
        /// an empty working dir.
        #[must_use]
        pub fn calls(&self) -> Vec<(PathBuf, String)> {
            self.calls.lock().map_or_else(|_| vec![], |g| g.clone())
        }

        fn next(&self, dir: &Path, program: &str) -> anyhow::Result<ExecResult> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((dir.to_path_buf(), program.to_string()));
            }
            if self.spawn_error {
                anyhow::bail!("failed to execute: {program}");
            }
            let code = self
                .codes
                .lock()
                .map_or(0, |mut g| g.pop_front().unwrap_or(0));
            Ok(ExecResult {
                stdout: String::new(),
                stderr: if code == 0 { String::new() } else { "mock failure".to_string() },
                success: code == 0,
                code: Some(code),
            })
        }
    }

    impl Executor for MockExecutor {
        fn run_attached(&self, dir: &Path, program: &str, _: &[&str]) -> anyhow::Result<()> {
            let result = self.next(dir, program)?;
            if !result.success {
                anyhow::bail!("{program} failed (exit {})", result.code.unwrap_or(-1));
            }
            Ok(())
        }

        fn run_unchecked(&self, program: &str, _: &[&str]) -> anyhow::Result<ExecResult> {
            self.next(Path::new(""), program)
        }

        fn which(&self, _: &str) -> bool {
            !self.spawn_error
        }
    }

    /// In-memory [`Log`] capturing messages by level.
    #[derive(Debug, Default)]
    pub struct RecordingLog {
        infos: Mutex<Vec<String>>,
        warnings: Mutex<Vec<String>>,
        records: Mutex<Vec<String>>,
    }

    impl RecordingLog {
        pub fn infos(&self) -> Vec<String> {
            self.infos.lock().map_or_else(|_| vec![], |g| g.clone())
        }

        pub fn warnings(&self) -> Vec<String> {
            self.warnings.lock().map_or_else(|_| vec![], |g| g.clone())
        }

        /// Labels passed to [`Log::record`], in order.
        pub fn records(&self) -> Vec<String> {
            self.records.lock().map_or_else(|_| vec![], |g| g.clone())
        }
    }

    impl Log for RecordingLog {
        fn stage(&self, msg: &str) {
            self.info(msg);
        }

        fn info(&self, msg: &str) {
            if let Ok(mut g) = self.infos.lock() {
                g.push(msg.to_string());
            }
        }

        fn debug(&self, _: &str) {}

        fn warn(&self, msg: &str) {
            if let Ok(mut g) = self.warnings.lock() {
                g.push(msg.to_string());
            }
        }

        fn error(&self, msg: &str) {
            self.warn(msg);
        }

        fn record(&self, name: &str, _: OpStatus, _: Option<&str>) {
            if let Ok(mut g) = self.records.lock() {
                g.push(name.to_string());
            }
        }
    }

    /// Temporary installation root and home directory.
    ///
    /// Root and home are canonicalized so symlink destinations compare equal
    /// to layer sources on platforms where the temp dir is itself a link.
    #[derive(Debug)]
    pub struct Fixture {
        _dir: tempfile::TempDir,
        pub root: PathBuf,
        pub home: PathBuf,
        pub executor: Arc<MockExecutor>,
        pub log: Arc<RecordingLog>,
    }

    impl Fixture {
        pub fn new() -> Self {
            let dir = tempfile::tempdir().expect("create temp dir");
            let base = dunce::canonicalize(dir.path()).expect("canonicalize temp dir");
            let (root, home) = (base.join("root"), base.join("home"));
            std::fs::create_dir_all(&root).unwrap();
            std::fs::create_dir_all(&home).unwrap();
            Self {
                _dir: dir,
                root,
                home,
                executor: Arc::new(MockExecutor::default()),
                log: Arc::new(RecordingLog::default()),
            }
        }

        fn write(path: &Path, content: &str) {
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }

        pub fn layer_path(&self, layer: &str, rel: &str) -> PathBuf {
            self.root.join(layer).join("home").join(rel)
        }

        pub fn home_path(&self, rel: &str) -> PathBuf {
            self.home.join(rel)
        }

        /// Add `rel` with `content` to `layer`'s home subtree.
        #[must_use]
        pub fn layer_file(self, layer: &str, rel: &str, content: &str) -> Self {
            Self::write(&self.layer_path(layer, rel), content);
            self
        }

        /// Add a hook file under `<layer>/<kind>/`.
        #[must_use]
        pub fn hook(self, layer: &str, kind: &str, name: &str) -> Self {
            Self::write(
                &self.root.join(layer).join(kind).join(name),
                "#!/bin/sh\n",
            );
            self
        }

        /// Add a file directly under the installation root.
        #[must_use]
        pub fn root_file(self, rel: &str, content: &str) -> Self {
            Self::write(&self.root.join(rel), content);
            self
        }

        /// Add a plain file to the home directory.
        #[must_use]
        pub fn home_file(self, rel: &str, content: &str) -> Self {
            Self::write(&self.home_path(rel), content);
            self
        }

        /// Link home `rel` to `layer`'s copy of it.
        #[must_use]
        pub fn link_home(self, rel: &str, layer: &str) -> Self {
            let link = self.home_path(rel);
            std::fs::create_dir_all(link.parent().unwrap()).unwrap();
            crate::engine::fs::create_symlink(&self.layer_path(layer, rel), &link).unwrap();
            self
        }

        #[must_use]
        pub fn with_executor(mut self, executor: MockExecutor) -> Self {
            self.executor = Arc::new(executor);
            self
        }

        pub fn read_home(&self, rel: &str) -> String {
            std::fs::read_to_string(self.home_path(rel)).unwrap()
        }

        pub fn read_layer(&self, layer: &str, rel: &str) -> String {
            std::fs::read_to_string(self.layer_path(layer, rel)).unwrap()
        }

        pub fn inventory(&self) -> Inventory {
            Inventory::scan(&self.root, &self.home).expect("scan inventory")
        }

        pub fn context(&self) -> Context {
            self.context_with_prompt(Arc::new(AssumeYes))
        }

        pub fn context_with_prompt(&self, prompt: Arc<dyn Prompt>) -> Context {
            Context::new(
                Arc::new(ByteComparator),
                prompt,
                Arc::clone(&self.executor) as Arc<dyn Executor>,
                Arc::clone(&self.log) as Arc<dyn Log>,
            )
        }
    }
}
