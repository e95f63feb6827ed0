//! Color-coded picking: encode node ids as colors, render them off-screen,
//! and decode the single pixel under a click back into an id.
//!
//! DESIGN
//! ======
//! Each node is drawn into the picking target with `(id>>16, id>>8, id) / 255`
//! at full alpha, reusing the visible pass's geometry, transform, and depth
//! test. The target is cleared to transparent black, which decodes to id 0,
//! the reserved miss sentinel. A click costs one full-tree draw plus one
//! blocking one-pixel readback, independent of how nodes overlap in 3D.

#[cfg(test)]
#[path = "pick_test.rs"]
mod pick_test;

use tracing::debug;

use crate::camera::{CameraState, Point};
use crate::color::Rgba;
use crate::config::ViewerConfig;
use crate::consts::{MAX_PICK_ID, PICK_MISS_ID};
use crate::render;
use crate::surface::{GpuSurface, RenderTarget, SurfaceError, SurfaceSize};
use crate::tree::{NodeId, TreeError, ViewNode};
use crate::walker;

/// Clear color of the picking target; decodes to [`PICK_MISS_ID`].
pub const PICK_CLEAR_COLOR: Rgba = Rgba::TRANSPARENT;

/// Error returned by [`pick`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PickError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Result of a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    /// A drag was in progress; no picking pass ran.
    Ignored,
    /// Background or an unknown id was under the click.
    Miss,
    Hit(NodeId),
}

impl PickOutcome {
    /// The id to store as the selection.
    #[must_use]
    pub fn selection(self) -> Option<NodeId> {
        match self {
            Self::Hit(id) => Some(id),
            Self::Ignored | Self::Miss => None,
        }
    }
}

/// Reject ids that cannot round-trip through 24 bits.
///
/// # Errors
///
/// Returns [`TreeError::IdOverflow`] for `id > 2^24-1`.
pub fn check_id(id: NodeId) -> Result<(), TreeError> {
    if id > MAX_PICK_ID {
        return Err(TreeError::IdOverflow { id });
    }
    Ok(())
}

/// Encode `id` as opaque RGBA bytes.
///
/// # Errors
///
/// Returns [`TreeError::IdOverflow`] instead of truncating.
pub fn encode_id(id: NodeId) -> Result<[u8; 4], TreeError> {
    check_id(id)?;
    let [.., r, g, b] = id.to_be_bytes();
    Ok([r, g, b, 0xFF])
}

/// Encode `id` as a normalized color for the picking pass.
///
/// # Errors
///
/// Returns [`TreeError::IdOverflow`] instead of truncating.
pub fn id_to_color(id: NodeId) -> Result<Rgba, TreeError> {
    encode_id(id).map(Rgba::from_bytes)
}

/// `(r<<16) | (g<<8) | b`; alpha is ignored.
#[must_use]
pub fn decode_id(pixel: [u8; 4]) -> NodeId {
    let [r, g, b, _] = pixel;
    (u64::from(r) << 16) | (u64::from(g) << 8) | u64::from(b)
}

/// Decode a sampled pixel, mapping the clear color and the sentinel to `None`.
#[must_use]
pub fn decode_pick(pixel: [u8; 4]) -> Option<NodeId> {
    if pixel[3] == 0 {
        return None;
    }
    let id = decode_id(pixel);
    (id != PICK_MISS_ID).then_some(id)
}

/// Map a click in logical (CSS, top-left origin) pixels to a picking-target
/// pixel (backing pixels, bottom-left origin). Returns `None` for an empty
/// target.
///
/// A click anywhere inside screen row `k` (`k <= y < k + 1`) samples GL row
/// `height - 1 - k`, the row that holds that pixel's center. Clicks outside
/// the surface are clamped to its edge pixels.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn target_pixel(click: Point, logical: SurfaceSize, backing: SurfaceSize) -> Option<(u32, u32)> {
    if backing.is_empty() {
        return None;
    }
    let bw = f64::from(backing.width);
    let bh = f64::from(backing.height);
    let (sx, sy) = if logical.is_empty() {
        (1.0, 1.0)
    } else {
        (bw / f64::from(logical.width), bh / f64::from(logical.height))
    };

    let x = (click.x * sx).floor().clamp(0.0, bw - 1.0);
    let row = (click.y * sy).floor().clamp(0.0, bh - 1.0);
    Some((x as u32, (bh - 1.0 - row) as u32))
}

/// Render the picking pass and resolve the node under `click`.
///
/// Returns `Ok(None)` for background, the sentinel id, or an empty surface.
/// The caller is responsible for checking the decoded id against its index.
///
/// # Errors
///
/// Returns [`PickError::Tree`] before drawing anything if an id overflows,
/// or [`PickError::Surface`] if a draw or the readback fails.
pub fn pick<S: GpuSurface>(
    surface: &mut S,
    root: &ViewNode,
    camera: &CameraState,
    config: &ViewerConfig,
    click: Point,
) -> Result<Option<NodeId>, PickError> {
    let commands = walker::picking_commands(root, config)?;
    let Some((x, y)) = target_pixel(click, surface.logical_size(), surface.backing_size()) else {
        return Ok(None);
    };

    surface.clear(RenderTarget::Picking, PICK_CLEAR_COLOR)?;
    render::replay(surface, RenderTarget::Picking, &commands, camera, config)?;
    let pixel = surface.read_pixel(x, y, RenderTarget::Picking)?;
    let id = decode_pick(pixel);

    debug!(click_x = click.x, click_y = click.y, x, y, ?pixel, ?id, "pick");
    Ok(id)
}
