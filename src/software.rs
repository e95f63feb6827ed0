//! Headless [`GpuSurface`]: a small CPU rasterizer.
//!
//! Mirrors the GL pipeline the WebGL surface configures: clip-space transform,
//! perspective divide, viewport mapping with a bottom-left origin, a depth
//! buffer with `LEQUAL`, and pixel-center sampling. Triangles with a vertex at
//! or behind the eye plane are dropped rather than clipped.
//!
//! Used for tests and for hosts that want a picture without a GPU. It also
//! counts every call so callers can assert which passes ran.

#[cfg(test)]
#[path = "software_test.rs"]
mod software_test;

use glam::{Mat4, Vec3, Vec4};

use crate::color::Rgba;
use crate::projector::QuadVertices;
use crate::surface::{GpuSurface, Highlight, RenderTarget, SurfaceError, SurfaceSize};

/// Smallest clip-space `w` a vertex may have and still be rasterized.
const MIN_CLIP_W: f32 = 1e-6;

/// Call counters, reset only by [`SoftwareSurface::reset_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    pub resizes: usize,
    pub screen_clears: usize,
    pub picking_clears: usize,
    pub screen_draws: usize,
    pub picking_draws: usize,
    pub readbacks: usize,
}

#[derive(Debug, Clone)]
struct Framebuffer {
    size: SurfaceSize,
    color: Vec<[u8; 4]>,
    depth: Vec<f32>,
}

impl Framebuffer {
    fn new(size: SurfaceSize) -> Self {
        let len = size.width as usize * size.height as usize;
        Self { size, color: vec![[0; 4]; len], depth: vec![1.0; len] }
    }

    fn clear(&mut self, color: [u8; 4]) {
        self.color.fill(color);
        self.depth.fill(1.0);
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.size.width as usize + x as usize
    }

    fn get(&self, x: u32, y: u32) -> Result<[u8; 4], SurfaceError> {
        if x >= self.size.width || y >= self.size.height {
            return Err(SurfaceError::PixelOutOfBounds {
                x,
                y,
                width: self.size.width,
                height: self.size.height,
            });
        }
        Ok(self.color[self.index(x, y)])
    }

    /// Rasterize one triangle given in window coordinates (x, y in pixels, z in 0..1).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn fill_triangle(&mut self, tri: [Vec3; 3], color: [u8; 4]) {
        let [v0, v1, v2] = tri;
        let area = edge(v0, v1, v2);
        if area.abs() <= f32::EPSILON || self.size.is_empty() {
            return;
        }

        let w = self.size.width as f32;
        let h = self.size.height as f32;
        let min_x = v0.x.min(v1.x).min(v2.x).floor().clamp(0.0, w - 1.0) as u32;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil().clamp(0.0, w - 1.0) as u32;
        let min_y = v0.y.min(v1.y).min(v2.y).floor().clamp(0.0, h - 1.0) as u32;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil().clamp(0.0, h - 1.0) as u32;

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let p = Vec3::new(px as f32 + 0.5, py as f32 + 0.5, 0.0);
                let b0 = edge(v1, v2, p) / area;
                let b1 = edge(v2, v0, p) / area;
                let b2 = edge(v0, v1, p) / area;
                if b0 < 0.0 || b1 < 0.0 || b2 < 0.0 {
                    continue;
                }
                let depth = b0 * v0.z + b1 * v1.z + b2 * v2.z;
                if !(0.0..=1.0).contains(&depth) {
                    continue;
                }
                let i = self.index(px, py);
                if depth <= self.depth[i] {
                    self.depth[i] = depth;
                    self.color[i] = color;
                }
            }
        }
    }
}

/// Twice the signed area of `(a, b, p)` in the xy plane.
fn edge(a: Vec3, b: Vec3, p: Vec3) -> f32 {
    (p.x - a.x) * (b.y - a.y) - (p.y - a.y) * (b.x - a.x)
}

/// CPU-backed surface with a visible and a picking framebuffer.
#[derive(Debug, Clone)]
pub struct SoftwareSurface {
    logical: SurfaceSize,
    screen: Framebuffer,
    picking: Framebuffer,
    stats: SurfaceStats,
}

impl SoftwareSurface {
    /// A surface whose logical and backing sizes are both `width`×`height`.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let size = SurfaceSize::new(width, height);
        Self {
            logical: size,
            screen: Framebuffer::new(size),
            picking: Framebuffer::new(size),
            stats: SurfaceStats::default(),
        }
    }

    /// Change the layout size without touching the backing store, as a host
    /// layout pass would.
    pub fn set_logical_size(&mut self, size: SurfaceSize) {
        self.logical = size;
    }

    #[must_use]
    pub fn stats(&self) -> SurfaceStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = SurfaceStats::default();
    }

    /// Read a pixel without counting it as a readback.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::PixelOutOfBounds`] outside the target.
    pub fn pixel(&self, x: u32, y: u32, target: RenderTarget) -> Result<[u8; 4], SurfaceError> {
        self.buffer(target).get(x, y)
    }

    fn buffer(&self, target: RenderTarget) -> &Framebuffer {
        match target {
            RenderTarget::Screen => &self.screen,
            RenderTarget::Picking => &self.picking,
        }
    }

    fn buffer_mut(&mut self, target: RenderTarget) -> &mut Framebuffer {
        match target {
            RenderTarget::Screen => &mut self.screen,
            RenderTarget::Picking => &mut self.picking,
        }
    }

    /// Clip → NDC → window coordinates. `None` if the vertex is behind the eye.
    #[allow(clippy::cast_precision_loss)]
    fn to_window(&self, matrix: &Mat4, v: [f32; 3]) -> Option<Vec3> {
        let clip = *matrix * Vec4::new(v[0], v[1], v[2], 1.0);
        if clip.w <= MIN_CLIP_W {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let size = self.screen.size;
        Some(Vec3::new(
            (ndc.x + 1.0) * 0.5 * size.width as f32,
            (ndc.y + 1.0) * 0.5 * size.height as f32,
            (ndc.z + 1.0) * 0.5,
        ))
    }
}

impl GpuSurface for SoftwareSurface {
    fn backing_size(&self) -> SurfaceSize {
        self.screen.size
    }

    fn logical_size(&self) -> SurfaceSize {
        self.logical
    }

    fn resize(&mut self, size: SurfaceSize) -> Result<(), SurfaceError> {
        self.screen = Framebuffer::new(size);
        self.picking = Framebuffer::new(size);
        self.stats.resizes += 1;
        Ok(())
    }

    fn clear(&mut self, target: RenderTarget, color: Rgba) -> Result<(), SurfaceError> {
        match target {
            RenderTarget::Screen => self.stats.screen_clears += 1,
            RenderTarget::Picking => self.stats.picking_clears += 1,
        }
        self.buffer_mut(target).clear(color.to_bytes());
        Ok(())
    }

    fn draw_colored_quad(
        &mut self,
        target: RenderTarget,
        vertices: &QuadVertices,
        matrix: &Mat4,
        color: Rgba,
        highlight: Option<Highlight>,
    ) -> Result<(), SurfaceError> {
        match target {
            RenderTarget::Screen => self.stats.screen_draws += 1,
            RenderTarget::Picking => self.stats.picking_draws += 1,
        }
        let color = highlight.map_or(color, |h| h.apply(color)).to_bytes();

        for tri in vertices.chunks_exact(3) {
            let window = [
                self.to_window(matrix, tri[0]),
                self.to_window(matrix, tri[1]),
                self.to_window(matrix, tri[2]),
            ];
            if let [Some(a), Some(b), Some(c)] = window {
                self.buffer_mut(target).fill_triangle([a, b, c], color);
            }
        }
        Ok(())
    }

    fn read_pixel(&mut self, x: u32, y: u32, target: RenderTarget) -> Result<[u8; 4], SurfaceError> {
        self.stats.readbacks += 1;
        self.buffer(target).get(x, y)
    }
}
