//! Scene walking: flatten the view tree into an ordered list of draw commands.
//!
//! Traversal is depth-first pre-order with an explicit stack, so deep trees
//! never hit the call-stack limit. Building the command list is separate from
//! issuing it; the engine replays the list against a [`crate::surface::GpuSurface`].

#[cfg(test)]
#[path = "walker_test.rs"]
mod walker_test;

use tracing::warn;

use crate::color::Rgba;
use crate::config::ViewerConfig;
use crate::pick;
use crate::tree::{Bounds, NodeId, TreeError, ViewNode};

/// A node reached by the traversal, with its depth and assigned z.
#[derive(Debug, Clone, Copy)]
pub struct SceneItem<'a> {
    pub node: &'a ViewNode,
    pub depth: usize,
    pub z: f64,
}

/// How a command's quad is colored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    /// Visible pass: the node's resolved color, tinted if selected.
    Visible { color: Rgba, highlight: bool },
    /// Picking pass: `color` is `id` encoded as an opaque RGB color.
    Picking { id: NodeId, color: Rgba },
}

/// One quad to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub node_id: NodeId,
    pub bounds: Bounds,
    pub z: f64,
    pub paint: Paint,
}

/// Visit every node in pre-order, assigning `z = depth * depth_step`.
#[must_use]
pub fn walk(root: &ViewNode, depth_step: f64) -> Vec<SceneItem<'_>> {
    let mut items = Vec::new();
    let mut stack = vec![(root, 0_usize)];

    while let Some((node, depth)) = stack.pop() {
        #[allow(clippy::cast_precision_loss)]
        let z = depth as f64 * depth_step;
        items.push(SceneItem { node, depth, z });
        // Reverse so the first child is popped first.
        stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
    }
    items
}

/// Fill color for `node`, falling back to `default` when absent or unparsable.
#[must_use]
pub fn resolve_color(node: &ViewNode, default: Rgba) -> Rgba {
    let Some(hex) = node.background_color.as_deref() else {
        return default;
    };
    match Rgba::from_hex(hex) {
        Ok(color) => color,
        Err(e) => {
            warn!(id = node.id, error = %e, "unparsable backgroundColor; using default");
            default
        }
    }
}

/// Commands for the visible pass.
#[must_use]
pub fn visible_commands(root: &ViewNode, selected: Option<NodeId>, config: &ViewerConfig) -> Vec<DrawCommand> {
    walk(root, config.depth_step)
        .into_iter()
        .map(|item| DrawCommand {
            node_id: item.node.id,
            bounds: item.node.bounds,
            z: item.z,
            paint: Paint::Visible {
                color: resolve_color(item.node, config.default_node_color),
                highlight: selected == Some(item.node.id),
            },
        })
        .collect()
}

/// Commands for the picking pass.
///
/// # Errors
///
/// Returns [`TreeError::IdOverflow`] if any id cannot be encoded in 24 bits.
/// No commands are produced in that case.
pub fn picking_commands(root: &ViewNode, config: &ViewerConfig) -> Result<Vec<DrawCommand>, TreeError> {
    walk(root, config.depth_step)
        .into_iter()
        .map(|item| {
            let color = pick::id_to_color(item.node.id)?;
            Ok(DrawCommand {
                node_id: item.node.id,
                bounds: item.node.bounds,
                z: item.z,
                paint: Paint::Picking { id: item.node.id, color },
            })
        })
        .collect()
}
