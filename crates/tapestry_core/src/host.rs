//! Per-pass bundle of platform collaborators

use crate::assets::{AssetLoader, StaticAssets};
use crate::config::EngineConfig;
use crate::measure::{Measure, StyleMeasure};
use crate::retained::RetainedTree;
use crate::tree::PlatformTree;

/// Everything a render or update pass talks to.
///
/// A host is borrowed for exactly one pass; nothing in the engine keeps it.
pub struct Host<'a> {
    pub tree: &'a mut dyn PlatformTree,
    pub measure: &'a dyn Measure,
    pub assets: &'a mut dyn AssetLoader,
    pub config: &'a EngineConfig,
}

impl<'a> Host<'a> {
    pub fn new(
        tree: &'a mut dyn PlatformTree,
        measure: &'a dyn Measure,
        assets: &'a mut dyn AssetLoader,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            tree,
            measure,
            assets,
            config,
        }
    }
}

/// Owned in-memory collaborators: retained tree, style measurer, static
/// assets, and a configuration.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    pub tree: RetainedTree,
    pub measure: StyleMeasure,
    pub assets: StaticAssets,
    pub config: EngineConfig,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Replace the retained tree, e.g. one whose surfaces dash natively
    pub fn with_tree(mut self, tree: RetainedTree) -> Self {
        self.tree = tree;
        self
    }

    /// Borrow the collaborators for one pass
    pub fn host(&mut self) -> Host<'_> {
        Host {
            tree: &mut self.tree,
            measure: &self.measure,
            assets: &mut self.assets,
            config: &self.config,
        }
    }
}
