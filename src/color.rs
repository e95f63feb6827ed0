//! Colors: normalized RGBA, hex parsing, and highlight mixing.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

use serde::Deserialize;

/// Error returned by [`Rgba::from_hex`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    /// The string is not `#rgb`, `#rrggbb`, or `#rrggbbaa`.
    #[error("invalid hex color: {0:?}")]
    Invalid(String),
}

/// A color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build a color from 8-bit channels.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        let [r, g, b, a] = bytes;
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }

    /// Quantize to 8-bit channels, rounding to nearest.
    #[must_use]
    pub fn to_bytes(self) -> [u8; 4] {
        [
            channel_to_byte(self.r),
            channel_to_byte(self.g),
            channel_to_byte(self.b),
            channel_to_byte(self.a),
        ]
    }

    #[must_use]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Parse `#rgb`, `#rrggbb`, or `#rrggbbaa`. Alpha defaults to opaque.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::Invalid`] for anything else.
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::Invalid(hex.to_owned());
        let digits = hex.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let value = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;

        let bytes = match digits.len() {
            3 => {
                let expand = |nibble: u32| u8::try_from((nibble & 0xF) * 0x11).unwrap_or(u8::MAX);
                [expand(value >> 8), expand(value >> 4), expand(value), 0xFF]
            }
            6 => {
                let [_, r, g, b] = value.to_be_bytes();
                [r, g, b, 0xFF]
            }
            8 => value.to_be_bytes(),
            _ => return Err(invalid()),
        };
        Ok(Self::from_bytes(bytes))
    }

    /// Linear blend toward `other` by `t` (0 keeps `self`, 1 yields `other`).
    /// Alpha is kept from `self`.
    #[must_use]
    pub fn mix(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: f32, b: f32| a + (b - a) * t;
        Self::new(lerp(self.r, other.r), lerp(self.g, other.g), lerp(self.b, other.b), self.a)
    }
}

impl TryFrom<String> for Rgba {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel_to_byte(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}
