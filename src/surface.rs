//! The graphics backend seam.
//!
//! [`GpuSurface`] is the immediate-mode primitive set the engine draws with:
//! clear a target, draw one colored quad with a transform, read back one
//! pixel, and resize the backing store. [`crate::webgl::WebGlSurface`] drives a
//! browser canvas; [`crate::software::SoftwareSurface`] rasterizes on the CPU
//! for headless use and tests.

use glam::Mat4;

use crate::color::Rgba;
use crate::projector::QuadVertices;

/// Error returned by a [`GpuSurface`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// No graphics context could be obtained.
    #[error("graphics context unavailable: {0}")]
    ContextUnavailable(String),
    #[error("shader compile failed: {0}")]
    ShaderCompile(String),
    #[error("program link failed: {0}")]
    ProgramLink(String),
    /// A buffer, texture, or framebuffer could not be created.
    #[error("failed to allocate {0}")]
    Allocation(&'static str),
    #[error("pixel ({x}, {y}) is outside the {width}x{height} target")]
    PixelOutOfBounds { x: u32, y: u32, width: u32, height: u32 },
    /// A backend call failed after initialization.
    #[error("gpu call failed: {0}")]
    Gpu(String),
}

impl SurfaceError {
    /// Whether the error belongs to surface construction rather than drawing.
    #[must_use]
    pub fn is_initialization(&self) -> bool {
        matches!(
            self,
            Self::ContextUnavailable(_) | Self::ShaderCompile(_) | Self::ProgramLink(_) | Self::Allocation(_)
        )
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Where a draw lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    /// The visible drawable.
    Screen,
    /// The off-screen id-color target.
    Picking,
}

/// Tint applied to a selected node in the visible pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Highlight {
    pub color: Rgba,
    /// 0 leaves the node color untouched, 1 replaces it.
    pub mix: f32,
}

impl Highlight {
    #[must_use]
    pub fn apply(&self, base: Rgba) -> Rgba {
        base.mix(self.color, self.mix)
    }
}

/// Immediate-mode drawing primitives.
///
/// Pixel coordinates passed to [`GpuSurface::read_pixel`] use a bottom-left
/// origin, like GL framebuffers.
pub trait GpuSurface {
    /// Size of the drawable backing store.
    fn backing_size(&self) -> SurfaceSize;

    /// Size the host lays the surface out at (CSS pixels).
    fn logical_size(&self) -> SurfaceSize;

    /// Reallocate the backing store (and the picking target) at `size` and
    /// point the viewport at it.
    ///
    /// # Errors
    ///
    /// Returns an error if the picking target cannot be reallocated.
    fn resize(&mut self, size: SurfaceSize) -> Result<(), SurfaceError>;

    /// Clear color and depth of `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be bound.
    fn clear(&mut self, target: RenderTarget, color: Rgba) -> Result<(), SurfaceError>;

    /// Draw one opaque quad into `target` with depth test `LEQUAL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be bound or the upload fails.
    fn draw_colored_quad(
        &mut self,
        target: RenderTarget,
        vertices: &QuadVertices,
        matrix: &Mat4,
        color: Rgba,
        highlight: Option<Highlight>,
    ) -> Result<(), SurfaceError>;

    /// Read the RGBA bytes of one pixel of `target`.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::PixelOutOfBounds`] outside the target, or a
    /// backend error if the readback fails.
    fn read_pixel(&mut self, x: u32, y: u32, target: RenderTarget) -> Result<[u8; 4], SurfaceError>;

    /// Resize the backing store if it no longer matches the logical size.
    /// Returns whether a resize happened.
    ///
    /// # Errors
    ///
    /// Propagates [`GpuSurface::resize`] failures.
    fn sync_size(&mut self) -> Result<bool, SurfaceError> {
        let logical = self.logical_size();
        if logical == self.backing_size() {
            return Ok(false);
        }
        self.resize(logical)?;
        Ok(true)
    }
}
