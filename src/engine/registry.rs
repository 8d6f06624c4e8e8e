//! Deduplicated home-relative paths and the nodes bound to them.
//!
//! Each [`TrackedFile`] owns one [`Node`] per layer that supplies its path;
//! layers refer back to their files through [`FileId`]s. Lookup is keyed by
//! the lexically normalized relative path, so `./.vimrc` and `.vimrc` map
//! to the same file.
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use super::layer::LayerId;
use super::node::{Node, NodeRef};

/// Index of a [`TrackedFile`] inside a [`FileRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(usize);

/// One logical home-relative path and every layer's binding to it.
#[derive(Debug)]
pub struct TrackedFile {
    rel_path: PathBuf,
    target: PathBuf,
    nodes: Vec<Node>,
}

impl TrackedFile {
    /// Normalized path relative to the home root.
    #[must_use]
    pub fn rel_path(&self) -> &Path {
        &self.rel_path
    }

    /// Absolute path inside the home directory.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// The node `layer` holds for this file, if any.
    #[must_use]
    pub fn node(&self, layer: LayerId) -> Option<NodeRef<'_>> {
        self.nodes
            .iter()
            .position(|n| n.layer() == layer)
            .map(|index| NodeRef::new(self, index))
    }

    /// All nodes bound to this file, in layer registration order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> {
        (0..self.nodes.len()).map(|index| NodeRef::new(self, index))
    }

    pub(super) fn raw_node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Bind `layer` to this file, reusing an existing binding.
    fn bind(&mut self, layer: LayerId, source: PathBuf) {
        if !self.nodes.iter().any(|n| n.layer() == layer) {
            self.nodes.push(Node::new(layer, source));
        }
    }
}

/// Lookup-or-create store of [`TrackedFile`]s, rooted at the home directory.
#[derive(Debug)]
pub struct FileRegistry {
    home: PathBuf,
    files: Vec<TrackedFile>,
    index: HashMap<PathBuf, FileId>,
}

impl FileRegistry {
    /// Create an empty registry for targets under `home`.
    #[must_use]
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            files: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Home directory targets are resolved against.
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Return the file for `rel_path`, creating it on first sight.
    pub fn get_or_create(&mut self, rel_path: &Path) -> FileId {
        let rel_path = normalize(rel_path);
        if let Some(id) = self.index.get(&rel_path) {
            return *id;
        }
        let id = FileId(self.files.len());
        self.files.push(TrackedFile {
            target: self.home.join(&rel_path),
            rel_path: rel_path.clone(),
            nodes: Vec::new(),
        });
        self.index.insert(rel_path, id);
        id
    }

    /// Bind `layer` (whose copy lives at `source`) to the file for `rel_path`.
    pub fn bind(&mut self, rel_path: &Path, layer: LayerId, source: PathBuf) -> FileId {
        let id = self.get_or_create(rel_path);
        if let Some(file) = self.files.get_mut(id.0) {
            file.bind(layer, source);
        }
        id
    }

    /// Look up a file without creating it.
    #[must_use]
    pub fn find(&self, rel_path: &Path) -> Option<&TrackedFile> {
        self.index
            .get(&normalize(rel_path))
            .and_then(|id| self.get(*id))
    }

    /// Access a file by id.
    #[must_use]
    pub fn get(&self, id: FileId) -> Option<&TrackedFile> {
        self.files.get(id.0)
    }

    /// Number of distinct tracked paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// `true` when no path has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component. Does not touch the filesystem.
///
/// # Examples
///
/// ```
/// use dotlayers::engine::registry::normalize;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(normalize(Path::new("./a/b/../c")), PathBuf::from("a/c"));
/// ```
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
