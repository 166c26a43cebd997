//! Responsive layout arithmetic for the two-page spread.

use crate::config::FlipbookConfig;

/// Freeze override consulted by [`compute_container_width`].
///
/// While a pinch-zoom gesture is in progress the page width is pinned to the
/// value captured when the gesture started.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutState {
    pub frozen: bool,
    pub frozen_width: Option<f64>,
}

impl LayoutState {
    pub fn normal() -> Self {
        Self::default()
    }

    pub fn frozen_at(width: f64) -> Self {
        Self {
            frozen: true,
            frozen_width: Some(width),
        }
    }
}

/// Logical (CSS pixel) size of a rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

/// Backing-store size of a drawing surface in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

/// Width available to a single page for the given viewport width.
///
/// `min(max_book_width, viewport_width - horizontal_padding) * page_fraction`,
/// floored at `min_page_width`. A frozen layout with a recorded width returns
/// that width untouched.
pub fn compute_container_width(
    viewport_width: f64,
    config: &FlipbookConfig,
    state: &LayoutState,
) -> f64 {
    if state.frozen {
        if let Some(width) = state.frozen_width {
            return width;
        }
    }

    let available = if viewport_width.is_finite() {
        viewport_width - config.horizontal_padding
    } else {
        config.max_book_width
    };
    let outer_width = config.max_book_width.min(available);

    (outer_width * config.page_fraction).max(config.min_page_width)
}

/// Device pixel ratio with broken values (0, negative, NaN) mapped to 1.
pub fn normalize_device_pixel_ratio(dpr: f64) -> f64 {
    if dpr.is_finite() && dpr > 0.0 {
        dpr
    } else {
        1.0
    }
}

/// Backing-store size for a surface shown at `display` on a `dpr` screen.
pub fn backing_size(display: DisplaySize, dpr: f64) -> PixelSize {
    let dpr = normalize_device_pixel_ratio(dpr);
    let to_pixels = |logical: f64| ((logical * dpr).floor().max(1.0)).min(u32::MAX as f64) as u32;

    PixelSize {
        width: to_pixels(display.width),
        height: to_pixels(display.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FlipbookConfig {
        FlipbookConfig::default()
    }

    fn display(width: f64, height: f64) -> DisplaySize {
        DisplaySize { width, height }
    }

    fn pixels(width: u32, height: u32) -> PixelSize {
        PixelSize { width, height }
    }

    #[test]
    fn wide_viewport_is_capped_by_max_book_width() {
        let width = compute_container_width(1920.0, &config(), &LayoutState::normal());
        assert!((width - 900.0 * 0.48).abs() < 1e-9);
    }

    #[test]
    fn narrow_viewport_subtracts_padding() {
        let width = compute_container_width(640.0, &config(), &LayoutState::normal());
        assert!((width - 600.0 * 0.48).abs() < 1e-9);
    }

    #[test]
    fn frozen_layout_ignores_viewport() {
        let state = LayoutState::frozen_at(123.0);
        assert_eq!(compute_container_width(320.0, &config(), &state), 123.0);
        assert_eq!(compute_container_width(4000.0, &config(), &state), 123.0);
    }

    #[test]
    fn frozen_without_width_recomputes() {
        let state = LayoutState {
            frozen: true,
            frozen_width: None,
        };
        let width = compute_container_width(640.0, &config(), &state);
        assert!((width - 288.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_viewport_is_clamped_to_minimum() {
        assert_eq!(compute_container_width(40.0, &config(), &LayoutState::normal()), 1.0);
        assert_eq!(compute_container_width(0.0, &config(), &LayoutState::normal()), 1.0);
        assert_eq!(compute_container_width(-50.0, &config(), &LayoutState::normal()), 1.0);
    }

    #[test]
    fn backing_size_scales_and_floors() {
        assert_eq!(backing_size(display(432.0, 559.7), 2.0), pixels(864, 1119));
        assert_eq!(backing_size(display(100.4, 50.0), 1.5), pixels(150, 75));
    }

    #[test]
    fn backing_size_treats_bad_ratio_as_one() {
        let size = display(10.0, 20.0);
        assert_eq!(backing_size(size, 0.0), pixels(10, 20));
        assert_eq!(backing_size(size, f64::NAN), pixels(10, 20));
    }

    #[test]
    fn backing_size_never_collapses_to_zero() {
        assert_eq!(backing_size(display(0.2, 0.0), 1.0), pixels(1, 1));
    }
}
