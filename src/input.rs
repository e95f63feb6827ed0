//! Input model: pointer buttons and the host-facing event type.
//!
//! The host translates its native events (DOM `mousedown`, `wheel`, `blur`,
//! ...) into [`InputEvent`] values and hands them to
//! [`crate::engine::EngineCore::handle`]. Nothing in this crate registers
//! listeners itself.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
    /// Any other button, by its DOM `MouseEvent.button` code.
    Other(i16),
}

impl Button {
    /// Map a DOM `MouseEvent.button` code.
    #[must_use]
    pub fn from_dom(code: i16) -> Self {
        match code {
            0 => Self::Primary,
            1 => Self::Middle,
            2 => Self::Secondary,
            other => Self::Other(other),
        }
    }
}

/// An input event in surface-relative CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { pos: Point, button: Button },
    PointerMove { pos: Point },
    PointerUp,
    /// The pointer left the tracked surface.
    PointerLeave,
    /// The window or surface lost input focus.
    FocusLost,
    /// Vertical scroll amount (positive = away from the user / zoom out).
    Wheel { delta_y: f64 },
    /// A completed click; resolved by the picking pass.
    Click { pos: Point },
    /// The host layout changed; the backing store may need resizing.
    Resize,
}

impl InputEvent {
    /// Whether the event ends any drag in progress.
    #[must_use]
    pub fn ends_drag(&self) -> bool {
        matches!(self, Self::PointerUp | Self::PointerLeave | Self::FocusLost)
    }
}
