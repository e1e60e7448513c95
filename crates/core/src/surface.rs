//! Host-environment capabilities injected into the driver.
//!
//! The engine never touches the rendering environment directly; the host
//! hands it a read side (scroll geometry) and a write side (where the color
//! pair lands). This keeps the driver fully testable without a live surface.

use crate::color::Hsl;

/// Read access to the scrollable document's geometry.
pub trait Viewport {
    /// Current scroll offset from the top.
    fn scroll_y(&self) -> f64;

    /// Height of the visible area.
    fn viewport_height(&self) -> f64;

    /// Total height of the scrollable content.
    fn content_height(&self) -> f64;
}

/// Receives the color pair whenever the rendered value actually changes.
///
/// Both colors always arrive together in a single call; the driver never
/// writes them partially.
pub trait BackdropSink {
    fn set_colors(&mut self, bg: Hsl, end: Hsl);
}
