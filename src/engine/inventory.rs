//! The discovered layer set and the registry their nodes live in.
use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::walk;

use super::Context;
use super::layer::{Layer, LayerId};
use super::node::NodeRef;
use super::registry::FileRegistry;

/// Separator printed before each layer in the status report.
pub const REPORT_SEPARATOR: &str = "---------------------";

/// Every layer under an installation root, scanned once at startup.
#[derive(Debug)]
pub struct Inventory {
    root: PathBuf,
    layers: Vec<Layer>,
    registry: FileRegistry,
}

impl Inventory {
    /// Discover layers under `root` (non-hidden directories, in name order)
    /// whose targets live under `home`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root or a layer subtree cannot be read.
    pub fn scan(root: &Path, home: &Path) -> Result<Self, EngineError> {
        let mut registry = FileRegistry::new(home);
        let layers = walk::list_layer_dirs(root)?
            .iter()
            .enumerate()
            .map(|(index, dir)| Layer::scan(LayerId::new(index), dir, &mut registry))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            root: root.to_path_buf(),
            layers,
            registry,
        })
    }

    /// Installation root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All layers in discovery order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Shared file registry.
    #[must_use]
    pub const fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    /// Look up a layer by directory name.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NameNotFound`] if no layer has that name.
    pub fn find(&self, name: &str) -> Result<&Layer, EngineError> {
        self.layers
            .iter()
            .find(|layer| layer.name() == name)
            .ok_or_else(|| EngineError::NameNotFound(name.to_string()))
    }

    /// Look up a layer from an optional command-line argument.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingArgument`] when `name` is `None`, or
    /// [`EngineError::NameNotFound`].
    pub fn resolve(&self, name: Option<&str>) -> Result<&Layer, EngineError> {
        self.find(name.ok_or(EngineError::MissingArgument("layer"))?)
    }

    /// The node `layer` provides for `path`.
    ///
    /// `path` may be relative to home or absolute inside it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotTracked`] if the layer does not provide it.
    pub fn node<'a>(&'a self, layer: &Layer, path: &Path) -> Result<NodeRef<'a>, EngineError> {
        let rel = path.strip_prefix(self.registry.home()).unwrap_or(path);
        self.registry
            .find(rel)
            .and_then(|file| file.node(layer.id()))
            .ok_or_else(|| EngineError::NotTracked {
                layer: layer.name().to_string(),
                path: path.display().to_string(),
            })
    }

    /// Render the status of every layer and node, one per line.
    ///
    /// ```text
    /// ---------------------
    /// [S] vim
    ///   [S] .vimrc
    /// ```
    #[must_use]
    pub fn report(&self, ctx: &Context) -> String {
        let mut lines = Vec::new();
        for layer in &self.layers {
            lines.push(REPORT_SEPARATOR.to_string());
            lines.push(format!(
                "[{}] {}",
                layer.status(&self.registry, ctx).symbol(),
                layer.name()
            ));
            for node in layer.nodes(&self.registry) {
                lines.push(format!(
                    "  [{}] {}",
                    node.status(ctx).symbol(),
                    node.rel_path().display()
                ));
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl Inventory {
    /// Node lookup by layer name and relative path, panicking when absent.
    pub(crate) fn node_in(&self, layer: &str, path: &str) -> NodeRef<'_> {
        let layer = self.find(layer).expect("layer should exist");
        self.node(layer, Path::new(path))
            .expect("node should be tracked")
    }
}
