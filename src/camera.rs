//! Orbit camera: distance/yaw/pitch around the origin plus a 2D pan offset.
//!
//! The camera is mutated only through the pointer and wheel transitions below.
//! Each transition is a plain method with no I/O so the whole state machine
//! can be exercised without a windowing system; [`crate::input`] adapts host
//! events onto these calls.
//!
//! ```text
//!              primary down              release / leave / blur
//!   None ───────────────────────▶ Rotate ─────────────────────▶ None
//!     │    middle/secondary down          release / leave / blur   ▲
//!     └─────────────────────────▶ Pan ────────────────────────────┘
//! ```

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use glam::DVec3;

use crate::config::ViewerConfig;
use crate::input::Button;

/// A point in screen space (CSS pixels, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What a pointer drag currently does to the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragMode {
    #[default]
    None,
    Rotate,
    Pan,
}

/// Per-viewport camera state.
///
/// `angle_x` (pitch) and `angle_y` (yaw) are radians and deliberately
/// unbounded. `offset_x` / `offset_y` translate the scene in world units
/// before the view transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub distance: f64,
    pub angle_x: f64,
    pub angle_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub fov: f64,
    pub dragging: bool,
    pub drag_mode: DragMode,
    pub last_pointer: Point,
    tuning: Tuning,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tuning {
    rotate: f64,
    pan: f64,
    zoom: f64,
    min_distance: f64,
    max_distance: f64,
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(&ViewerConfig::default())
    }
}

impl CameraState {
    #[must_use]
    pub fn new(config: &ViewerConfig) -> Self {
        let (min_distance, max_distance) = config.distance_range();
        Self {
            distance: config.clamp_distance(config.initial_distance),
            angle_x: 0.0,
            angle_y: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            fov: config.fov,
            dragging: false,
            drag_mode: DragMode::None,
            last_pointer: Point::default(),
            tuning: Tuning {
                rotate: config.rotate_sensitivity,
                pan: config.pan_sensitivity,
                zoom: config.zoom_sensitivity,
                min_distance,
                max_distance,
            },
        }
    }

    /// Eye position on the orbit sphere, looking at the origin.
    #[must_use]
    pub fn eye(&self) -> DVec3 {
        let (sin_x, cos_x) = self.angle_x.sin_cos();
        let (sin_y, cos_y) = self.angle_y.sin_cos();
        self.distance * DVec3::new(-sin_y * cos_x, sin_x, cos_y * cos_x)
    }

    /// Begin a drag. Unrecognized buttons cancel any drag instead.
    pub fn on_pointer_down(&mut self, pt: Point, button: Button) {
        let mode = match button {
            Button::Primary => DragMode::Rotate,
            Button::Middle | Button::Secondary => DragMode::Pan,
            Button::Other(_) => {
                self.end_drag();
                return;
            }
        };
        self.drag_mode = mode;
        self.dragging = true;
        self.last_pointer = pt;
    }

    /// Apply the delta since the last pointer position. Returns whether the
    /// camera changed.
    pub fn on_pointer_move(&mut self, pt: Point) -> bool {
        if !self.dragging {
            return false;
        }
        let dx = pt.x - self.last_pointer.x;
        let dy = pt.y - self.last_pointer.y;
        self.last_pointer = pt;

        match self.drag_mode {
            DragMode::Rotate => {
                self.angle_y += dx * self.tuning.rotate;
                self.angle_x += dy * self.tuning.rotate;
            }
            DragMode::Pan => {
                // Screen y grows downward, world y grows upward.
                self.offset_x += dx * self.tuning.pan;
                self.offset_y -= dy * self.tuning.pan;
            }
            DragMode::None => return false,
        }
        dx != 0.0 || dy != 0.0
    }

    pub fn on_pointer_up(&mut self) {
        self.end_drag();
    }

    pub fn on_pointer_leave(&mut self) {
        self.end_drag();
    }

    pub fn on_focus_lost(&mut self) {
        self.end_drag();
    }

    /// Zoom by moving along the orbit radius, clamped to the distance range.
    pub fn on_wheel(&mut self, delta_y: f64) {
        if !delta_y.is_finite() {
            return;
        }
        let next = self.distance + delta_y * self.tuning.zoom;
        self.distance = next.max(self.tuning.min_distance).min(self.tuning.max_distance);
    }

    /// Stop tracking the pointer. Safe to call when already idle.
    pub fn end_drag(&mut self) {
        self.dragging = false;
        self.drag_mode = DragMode::None;
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }
}
