use engine_core::Viewport;

use crate::constants::POINTER_DIVISOR;

/// Pointer displacement from the viewport center, in scene units.
///
/// Written by the pointer-move handler and read by the next animation step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerOffset {
    pub x: f64,
    pub y: f64,
}

impl PointerOffset {
    /// Offset for a pointer at logical `(x, y)` inside `viewport`.
    pub fn from_pointer(x: f64, y: f64, viewport: &Viewport) -> Self {
        Self {
            x: (x - viewport.width / 2.0) / POINTER_DIVISOR,
            y: (y - viewport.height / 2.0) / POINTER_DIVISOR,
        }
    }
}
