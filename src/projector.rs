//! Geometry projection: node rectangles to quads, camera state to a clip-space transform.
//!
//! Everything here is a pure function of its arguments. The engine recomputes
//! the transform for every draw call rather than caching it, so no function in
//! this module holds state between calls.

#[cfg(test)]
#[path = "projector_test.rs"]
mod projector_test;

use glam::{DMat4, DVec3, Mat4};

use crate::camera::CameraState;
use crate::config::{ProjectionMode, ViewerConfig};
use crate::surface::SurfaceSize;
use crate::tree::Bounds;

/// Six vertices (two triangles) covering one node rectangle.
pub type QuadVertices = [[f32; 3]; 6];

/// Two triangles covering `bounds` at constant depth `z`.
///
/// Winding: `(l,b) (r,b) (r,t)` then `(l,b) (r,t) (l,t)`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn quad_vertices(bounds: &Bounds, z: f64) -> QuadVertices {
    let (l, t, r, b, z) = (
        bounds.left as f32,
        bounds.top as f32,
        bounds.right as f32,
        bounds.bottom as f32,
        z as f32,
    );
    [[l, b, z], [r, b, z], [r, t, z], [l, b, z], [r, t, z], [l, t, z]]
}

/// Width over height, falling back to 1.0 for a collapsed surface.
#[must_use]
pub fn aspect_ratio(size: SurfaceSize) -> f64 {
    if size.width == 0 || size.height == 0 {
        return 1.0;
    }
    f64::from(size.width) / f64::from(size.height)
}

/// Perspective projection for the camera's field of view.
#[must_use]
pub fn projection_matrix(camera: &CameraState, aspect: f64, near: f64, far: f64) -> DMat4 {
    DMat4::perspective_rh_gl(camera.fov, aspect, near, far)
}

/// View matrix looking from [`CameraState::eye`] at the origin, +Y up.
#[must_use]
pub fn view_matrix(camera: &CameraState) -> DMat4 {
    DMat4::look_at_rh(camera.eye(), DVec3::ZERO, DVec3::Y)
}

/// `projection × view × translate(offset_x, offset_y, 0)`.
#[must_use]
pub fn orbit_transform(camera: &CameraState, aspect: f64, near: f64, far: f64) -> DMat4 {
    let pan = DMat4::from_translation(DVec3::new(camera.offset_x, camera.offset_y, 0.0));
    projection_matrix(camera, aspect, near, far) * view_matrix(camera) * pan
}

/// Pixel-space orthographic mapping: `x/w*2-1`, `1-y/h*2`, depth `-z/far`.
#[must_use]
pub fn flat_transform(size: SurfaceSize, far: f64) -> DMat4 {
    let w = f64::from(size.width.max(1));
    let h = f64::from(size.height.max(1));
    DMat4::orthographic_rh_gl(0.0, w, h, 0.0, -far, far)
}

/// The transform for one draw call, in the configured projection mode.
///
/// `size` is the surface's logical (CSS) size; it sets the aspect ratio in
/// orbit mode and the pixel mapping in flat mode.
#[must_use]
pub fn quad_transform(config: &ViewerConfig, camera: &CameraState, size: SurfaceSize) -> Mat4 {
    let m = match config.projection {
        ProjectionMode::Orbit => orbit_transform(camera, aspect_ratio(size), config.near, config.far),
        ProjectionMode::Flat => flat_transform(size, config.far),
    };
    m.as_mat4()
}
