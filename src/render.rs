//! Rendering: replays draw commands against a [`GpuSurface`].
//!
//! This module is the only place that turns [`DrawCommand`]s into surface
//! calls. It reads camera and config state but never mutates application
//! state. Both the visible pass and the picking pass go through [`replay`], so
//! they share geometry, transform, and depth behavior exactly.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::camera::CameraState;
use crate::config::ViewerConfig;
use crate::projector;
use crate::surface::{GpuSurface, Highlight, RenderTarget, SurfaceError};
use crate::tree::{NodeId, ViewNode};
use crate::walker::{self, DrawCommand, Paint};

/// Issue one `draw_colored_quad` per command, in order.
///
/// The transform is recomputed for every command.
///
/// # Errors
///
/// Stops at the first surface error.
pub fn replay<S: GpuSurface>(
    surface: &mut S,
    target: RenderTarget,
    commands: &[DrawCommand],
    camera: &CameraState,
    config: &ViewerConfig,
) -> Result<(), SurfaceError> {
    #[allow(clippy::cast_possible_truncation)]
    let highlight = Highlight { color: config.highlight_color, mix: config.highlight_mix as f32 };

    for cmd in commands {
        let matrix = projector::quad_transform(config, camera, surface.logical_size());
        let vertices = projector::quad_vertices(&cmd.bounds, cmd.z);
        let (color, tint) = match cmd.paint {
            Paint::Visible { color, highlight: selected } => (color, selected.then_some(highlight)),
            Paint::Picking { color, .. } => (color, None),
        };
        surface.draw_colored_quad(target, &vertices, &matrix, color, tint)?;
    }
    Ok(())
}

/// Clear the screen and draw the visible pass.
///
/// # Errors
///
/// Propagates surface errors.
pub fn draw<S: GpuSurface>(
    surface: &mut S,
    root: &ViewNode,
    selected: Option<NodeId>,
    camera: &CameraState,
    config: &ViewerConfig,
) -> Result<(), SurfaceError> {
    let commands = walker::visible_commands(root, selected, config);
    surface.clear(RenderTarget::Screen, config.clear_color)?;
    replay(surface, RenderTarget::Screen, &commands, camera, config)
}
