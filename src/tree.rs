//! View tree model: the externally supplied nodes and the id index built over them.
//!
//! A [`ViewNode`] tree arrives from the host (usually as JSON) and is read-only
//! for the rest of the crate. [`Scene`] takes ownership of one tree, validates
//! that every id is unique and fits the 24-bit picking encoding, and keeps an
//! id → node index so a decoded pick resolves in O(depth).

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::consts::{MAX_PICK_ID, PICK_MISS_ID};

/// Identifier of a view node, unique within one tree.
pub type NodeId = u64;

/// Error returned when a tree cannot be indexed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The id does not fit the 24-bit picking color.
    #[error("node id {id} exceeds the 24-bit picking range (max {max})", max = MAX_PICK_ID)]
    IdOverflow { id: NodeId },
    /// Two nodes share an id.
    #[error("duplicate node id: {0}")]
    DuplicateId(NodeId),
}

/// Axis-aligned rectangle in the tree's 2D coordinate space.
///
/// Serialized as `[left, top, right, bottom]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Bounds {
    #[must_use]
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self { left, top, right, bottom }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

impl From<[f64; 4]> for Bounds {
    fn from([left, top, right, bottom]: [f64; 4]) -> Self {
        Self { left, top, right, bottom }
    }
}

impl From<Bounds> for [f64; 4] {
    fn from(b: Bounds) -> Self {
        [b.left, b.top, b.right, b.bottom]
    }
}

/// One rectangular region of the view tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewNode {
    pub id: NodeId,
    pub bounds: Bounds,
    /// Hex fill color; the configured default gray when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Paint order: earlier children are drawn first.
    #[serde(default)]
    pub children: Vec<ViewNode>,
}

impl ViewNode {
    #[must_use]
    pub fn new(id: NodeId, bounds: Bounds) -> Self {
        Self { id, bounds, background_color: None, children: Vec::new() }
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<ViewNode>) -> Self {
        self.children = children;
        self
    }
}

/// Where a node sits: its parent, its index among the parent's children,
/// and its depth. The root has no parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    parent: Option<NodeId>,
    index: usize,
    depth: usize,
}

/// A validated tree plus its id index.
///
/// The index stores one parent link per node, so building it is linear in
/// the node count however deep the tree is. A lookup walks the links back
/// up to the root, then descends.
#[derive(Debug, Clone)]
pub struct Scene {
    root: ViewNode,
    slots: HashMap<NodeId, Slot>,
    max_depth: usize,
}

impl Scene {
    /// Take ownership of `root` and index every node by id.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::IdOverflow`] if any id exceeds 2^24-1 and
    /// [`TreeError::DuplicateId`] if an id appears twice.
    pub fn new(root: ViewNode) -> Result<Self, TreeError> {
        let mut slots = HashMap::new();
        let mut max_depth = 0;
        let mut stack = vec![(&root, Slot { parent: None, index: 0, depth: 0 })];

        while let Some((node, slot)) = stack.pop() {
            if node.id > MAX_PICK_ID {
                return Err(TreeError::IdOverflow { id: node.id });
            }
            if node.id == PICK_MISS_ID {
                warn!(id = node.id, "node id collides with the pick-miss sentinel; it cannot be selected");
            }
            if slots.insert(node.id, slot).is_some() {
                return Err(TreeError::DuplicateId(node.id));
            }
            max_depth = max_depth.max(slot.depth);
            stack.extend(node.children.iter().enumerate().map(|(index, child)| {
                (child, Slot { parent: Some(node.id), index, depth: slot.depth + 1 })
            }));
        }

        info!(nodes = slots.len(), max_depth, "view tree indexed");
        Ok(Self { root, slots, max_depth })
    }

    #[must_use]
    pub fn root(&self) -> &ViewNode {
        &self.root
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&ViewNode> {
        let mut slot = *self.slots.get(&id)?;
        let mut route = Vec::with_capacity(slot.depth);
        while let Some(parent) = slot.parent {
            route.push(slot.index);
            slot = *self.slots.get(&parent)?;
        }
        route.iter().rev().try_fold(&self.root, |node, &i| node.children.get(i))
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Tree depth of `id` (root is 0).
    #[must_use]
    pub fn depth_of(&self, id: NodeId) -> Option<usize> {
        self.slots.get(&id).map(|slot| slot.depth)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}
