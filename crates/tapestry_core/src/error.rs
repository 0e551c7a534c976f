//! Error types for tapestry_core

use thiserror::Error;

use crate::tree::{NodeId, NodeKind};

/// Failures reported by platform collaborators.
///
/// These never cross the engine's public entry points: the differ and the
/// collage renderer treat them as cache misses and render the affected
/// subtree fresh.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TapestryError {
    /// The node does not exist in the retained tree
    #[error("retained node {0:?} is missing")]
    MissingNode(NodeId),

    /// The node is not a child of the given parent
    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    /// A node had a different kind than the pass expected
    #[error("node {node:?} is a {found:?}, expected {expected:?}")]
    UnexpectedKind {
        node: NodeId,
        expected: NodeKind,
        found: NodeKind,
    },

    /// The node cannot be attached under itself or its descendants
    #[error("node {0:?} cannot become its own descendant")]
    Cycle(NodeId),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, TapestryError>;
