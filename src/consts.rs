//! Shared numeric constants for the viewstack crate.

use std::f64::consts::FRAC_PI_4;

// ── Camera ──────────────────────────────────────────────────────

/// Orbit radius a fresh camera starts at.
pub const DEFAULT_DISTANCE: f64 = 400.0;

/// Closest the camera may orbit.
pub const MIN_DISTANCE: f64 = 50.0;

/// Farthest the camera may orbit.
pub const MAX_DISTANCE: f64 = 2000.0;

/// Vertical field of view (45°).
pub const DEFAULT_FOV: f64 = FRAC_PI_4;

/// Radians of yaw/pitch per pixel of rotate-drag.
pub const ROTATE_SENSITIVITY: f64 = 0.01;

/// World units of pan per pixel of pan-drag.
pub const PAN_SENSITIVITY: f64 = 1.0;

/// Distance change per wheel delta unit.
pub const ZOOM_SENSITIVITY: f64 = 0.5;

// ── Projection ──────────────────────────────────────────────────

/// Near clip plane.
pub const NEAR_PLANE: f64 = 0.1;

/// Far clip plane.
pub const FAR_PLANE: f64 = 5000.0;

// ── Scene ───────────────────────────────────────────────────────

/// Z distance between consecutive tree depths.
pub const DEPTH_STEP: f64 = 10.0;

/// Fill for nodes without a `backgroundColor` (`#cccccc`).
pub const DEFAULT_NODE_COLOR: [u8; 4] = [0xCC, 0xCC, 0xCC, 0xFF];

/// Tint mixed into the selected node (`#ffcc00`).
pub const DEFAULT_HIGHLIGHT_COLOR: [u8; 4] = [0xFF, 0xCC, 0x00, 0xFF];

/// Fraction of the highlight tint mixed into a selected node.
pub const DEFAULT_HIGHLIGHT_MIX: f64 = 0.5;

// ── Picking ─────────────────────────────────────────────────────

/// Largest id that survives the 24-bit RGB encoding.
pub const MAX_PICK_ID: u64 = (1 << 24) - 1;

/// Decoded id meaning "nothing under the cursor".
pub const PICK_MISS_ID: u64 = 0;
