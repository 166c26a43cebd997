//! Typed view of the hosting page.
//!
//! The viewer never touches the DOM directly; it goes through
//! [`ViewerHost`] for its anchors (document reference, two drawing surfaces,
//! page indicator) and environment readings (viewport width, pixel ratio).

use crate::layout::{DisplaySize, PixelSize};
use crate::spread::PageSide;

/// A 2D raster target for one page.
pub trait DrawingSurface {
    /// Sets the backing store to `backing`, the logical size to `display`,
    /// and the drawing transform to a uniform `device_pixel_ratio` scale.
    fn resize(&self, backing: PixelSize, display: DisplaySize, device_pixel_ratio: f64);

    /// Erases the drawable area.
    fn clear(&self);
}

pub trait ViewerHost: 'static {
    type Surface: DrawingSurface;

    /// Reference the document source opens, e.g. a URL.
    fn source_ref(&self) -> String;

    /// Surface for one side of the spread, if the page provides it.
    fn surface(&self, side: PageSide) -> Option<&Self::Surface>;

    /// Layout viewport width in CSS pixels.
    fn viewport_width(&self) -> f64;

    fn device_pixel_ratio(&self) -> f64;

    fn set_indicator_text(&self, text: &str);

    /// Replaces the viewer content with a static message.
    fn show_load_error(&self, message: &str);
}
