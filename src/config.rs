//! Viewer tunables: camera limits, sensitivities, projection, and palette.
//!
//! Every field has a default matching the constants in [`crate::consts`]. The
//! host may override any subset by passing a JSON object with camelCase keys,
//! e.g. `{"maxDistance": 3000, "projection": "flat"}`.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::color::Rgba;
use crate::consts::{
    DEFAULT_DISTANCE, DEFAULT_FOV, DEFAULT_HIGHLIGHT_COLOR, DEFAULT_HIGHLIGHT_MIX, DEFAULT_NODE_COLOR, DEPTH_STEP,
    FAR_PLANE, MAX_DISTANCE, MIN_DISTANCE, NEAR_PLANE, PAN_SENSITIVITY, ROTATE_SENSITIVITY, ZOOM_SENSITIVITY,
};

/// Error returned by [`ViewerConfig::from_json`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse viewer config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid viewer config: {0}")]
    Invalid(String),
}

/// How node rectangles are mapped to clip space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMode {
    /// Perspective orbit camera.
    #[default]
    Orbit,
    /// Pixel-space orthographic mapping; camera state is ignored.
    Flat,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    pub initial_distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    /// Vertical field of view in radians.
    pub fov: f64,
    pub near: f64,
    pub far: f64,
    pub rotate_sensitivity: f64,
    pub pan_sensitivity: f64,
    pub zoom_sensitivity: f64,
    /// Z distance between tree depths.
    pub depth_step: f64,
    pub clear_color: Rgba,
    pub default_node_color: Rgba,
    pub highlight_color: Rgba,
    /// Fraction of `highlight_color` mixed into the selected node.
    pub highlight_mix: f64,
    pub projection: ProjectionMode,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            initial_distance: DEFAULT_DISTANCE,
            min_distance: MIN_DISTANCE,
            max_distance: MAX_DISTANCE,
            fov: DEFAULT_FOV,
            near: NEAR_PLANE,
            far: FAR_PLANE,
            rotate_sensitivity: ROTATE_SENSITIVITY,
            pan_sensitivity: PAN_SENSITIVITY,
            zoom_sensitivity: ZOOM_SENSITIVITY,
            depth_step: DEPTH_STEP,
            clear_color: Rgba::new(0.9, 0.9, 0.9, 1.0),
            default_node_color: Rgba::from_bytes(DEFAULT_NODE_COLOR),
            highlight_color: Rgba::from_bytes(DEFAULT_HIGHLIGHT_COLOR),
            highlight_mix: DEFAULT_HIGHLIGHT_MIX,
            projection: ProjectionMode::Orbit,
        }
    }
}

impl ViewerConfig {
    /// Parse overrides from JSON; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] if the result fails [`Self::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values describe a usable camera and projection.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: &str| Err(ConfigError::Invalid(msg.to_owned()));

        if !(self.min_distance > 0.0 && self.min_distance <= self.max_distance) {
            return fail("minDistance must be positive and <= maxDistance");
        }
        if !(self.min_distance..=self.max_distance).contains(&self.initial_distance) {
            return fail("initialDistance must lie within [minDistance, maxDistance]");
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return fail("near must be positive and far must exceed near");
        }
        if !(self.fov > 0.0 && self.fov < std::f64::consts::PI) {
            return fail("fov must lie within (0, pi)");
        }
        if !(self.depth_step.is_finite() && self.depth_step > 0.0) {
            return fail("depthStep must be positive");
        }
        if !(0.0..=1.0).contains(&self.highlight_mix) {
            return fail("highlightMix must lie within [0, 1]");
        }
        Ok(())
    }

    /// `(min_distance, max_distance)` in ascending order, even on a config
    /// that has not been validated.
    #[must_use]
    pub fn distance_range(&self) -> (f64, f64) {
        if self.min_distance <= self.max_distance {
            (self.min_distance, self.max_distance)
        } else {
            (self.max_distance, self.min_distance)
        }
    }

    /// Clamp an orbit distance to the configured range.
    ///
    /// Uses `max`/`min` rather than `f64::clamp`, which panics on inverted
    /// or NaN bounds.
    #[must_use]
    pub fn clamp_distance(&self, distance: f64) -> f64 {
        let (lo, hi) = self.distance_range();
        distance.max(lo).min(hi)
    }
}
