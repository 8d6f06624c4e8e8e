// Shared helpers for integration tests.
//
// Provides a temporary installation root and home directory plus a fluent
// builder so each integration test can lay out layers without repeating
// filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dotlayers::engine::Context;
use dotlayers::engine::compare::ByteComparator;
use dotlayers::engine::inventory::Inventory;
use dotlayers::engine::prompt::{AssumeYes, Prompt};
use dotlayers::exec::SystemExecutor;
use dotlayers::logging::Logger;

/// Prompt that declines every confirmation.
#[derive(Debug)]
pub struct DeclineAll;

impl Prompt for DeclineAll {
    fn confirm(&self, _question: &str) -> bool {
        false
    }
}

/// An isolated root/home pair backed by a [`tempfile::TempDir`].
///
/// Both directories are canonicalized so link destinations compare equal to
/// layer sources even when the temp dir lives behind a symlink.
pub struct LayerTree {
    _dir: tempfile::TempDir,
    pub root: PathBuf,
    pub home: PathBuf,
    pub log: Arc<Logger>,
}

impl LayerTree {
    /// Path of `rel` inside `layer`'s home subtree.
    pub fn layer_path(&self, layer: &str, rel: &str) -> PathBuf {
        self.root.join(layer).join("home").join(rel)
    }

    /// Path of `rel` inside the home directory.
    pub fn home_path(&self, rel: &str) -> PathBuf {
        self.home.join(rel)
    }

    pub fn read_home(&self, rel: &str) -> String {
        std::fs::read_to_string(self.home_path(rel)).expect("read home file")
    }

    pub fn read_layer(&self, layer: &str, rel: &str) -> String {
        std::fs::read_to_string(self.layer_path(layer, rel)).expect("read layer file")
    }

    /// `true` if the home entry is a symlink (dangling or not).
    pub fn is_link(&self, rel: &str) -> bool {
        self.home_path(rel)
            .symlink_metadata()
            .is_ok_and(|m| m.is_symlink())
    }

    /// Scan the tree as the CLI would.
    pub fn inventory(&self) -> Inventory {
        Inventory::scan(&self.root, &self.home).expect("scan layers")
    }

    /// Context with byte comparison, real hooks and automatic confirmation.
    pub fn context(&self) -> Context {
        self.context_with_prompt(Arc::new(AssumeYes))
    }

    pub fn context_with_prompt(&self, prompt: Arc<dyn Prompt>) -> Context {
        Context::new(
            Arc::new(ByteComparator),
            prompt,
            Arc::new(SystemExecutor),
            Arc::clone(&self.log) as Arc<dyn dotlayers::logging::Log>,
        )
    }
}

/// Fluent builder for a [`LayerTree`].
pub struct LayerTreeBuilder {
    tree: LayerTree,
}

impl LayerTreeBuilder {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let base = dunce::canonicalize(dir.path()).expect("canonicalize temp dir");
        let (root, home) = (base.join("root"), base.join("home"));
        std::fs::create_dir_all(&root).expect("create root");
        std::fs::create_dir_all(&home).expect("create home");
        Self {
            tree: LayerTree {
                _dir: dir,
                root,
                home,
                log: Arc::new(Logger::new("integration")),
            },
        }
    }

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
        std::fs::write(path, content).expect("write file");
    }

    /// Add `rel` to `layer`'s home subtree.
    pub fn layer_file(self, layer: &str, rel: &str, content: &str) -> Self {
        Self::write(&self.tree.layer_path(layer, rel), content);
        self
    }

    /// Add a plain file to the home directory.
    pub fn home_file(self, rel: &str, content: &str) -> Self {
        Self::write(&self.tree.home_path(rel), content);
        self
    }

    /// Add an executable shell hook under `<layer>/<kind>/<name>`.
    pub fn hook(self, layer: &str, kind: &str, name: &str, script: &str) -> Self {
        let path = self.tree.root.join(layer).join(kind).join(name);
        Self::write(&path, &format!("#!/bin/sh\n{script}\n"));
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt as _;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                .expect("chmod hook");
        }
        self
    }

    /// Add `dotlayers.toml` at the root.
    pub fn settings(self, toml: &str) -> Self {
        Self::write(&self.tree.root.join("dotlayers.toml"), toml);
        self
    }

    pub fn build(self) -> LayerTree {
        self.tree
    }
}
