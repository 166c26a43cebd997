//! Pinch-zoom freeze heuristic.
//!
//! Visual-viewport resizes that are not whole-window resizes are taken as a
//! pinch gesture in progress. While the gesture lasts the page width stays
//! pinned and window-resize re-renders are suppressed; once no signal has
//! arrived for the quiet period the layout thaws and one re-render runs.
//!
//! This type only tracks state. Scheduling the quiet-period timer is left to
//! the caller (see `Viewer::on_viewport_metrics_change`).

use crate::layout::LayoutState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoomPhase {
    #[default]
    Normal,
    Frozen,
}

/// Result of feeding one viewport signal into [`ZoomFreeze`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreezeTransition {
    /// Normal -> Frozen; the width was captured.
    Entered,
    /// Already frozen; only the quiet-period timer restarts.
    Extended,
}

#[derive(Debug, Clone, Default)]
pub struct ZoomFreeze {
    phase: ZoomPhase,
    frozen_width: Option<f64>,
}

impl ZoomFreeze {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ZoomPhase {
        self.phase
    }

    pub fn is_frozen(&self) -> bool {
        self.phase == ZoomPhase::Frozen
    }

    pub fn frozen_width(&self) -> Option<f64> {
        self.frozen_width
    }

    /// Records a viewport-metrics signal. `current_width` is captured only on
    /// the Normal -> Frozen edge.
    pub fn on_viewport_signal(&mut self, current_width: f64) -> FreezeTransition {
        match self.phase {
            ZoomPhase::Normal => {
                self.phase = ZoomPhase::Frozen;
                self.frozen_width = Some(current_width);
                FreezeTransition::Entered
            }
            ZoomPhase::Frozen => FreezeTransition::Extended,
        }
    }

    /// Quiet period elapsed. Returns `true` if this call left the frozen state.
    pub fn thaw(&mut self) -> bool {
        let was_frozen = self.is_frozen();
        self.phase = ZoomPhase::Normal;
        self.frozen_width = None;
        was_frozen
    }

    /// Window resizes do not trigger re-renders while frozen.
    pub fn suppresses_resize(&self) -> bool {
        self.is_frozen()
    }

    pub fn layout_state(&self) -> LayoutState {
        LayoutState {
            frozen: self.is_frozen(),
            frozen_width: self.frozen_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_signal_freezes_and_captures_width() {
        let mut zoom = ZoomFreeze::new();
        assert_eq!(zoom.on_viewport_signal(432.0), FreezeTransition::Entered);
        assert!(zoom.is_frozen());
        assert!(zoom.suppresses_resize());
        assert_eq!(zoom.layout_state(), LayoutState::frozen_at(432.0));
    }

    #[test]
    fn later_signals_keep_original_width() {
        let mut zoom = ZoomFreeze::new();
        zoom.on_viewport_signal(432.0);
        assert_eq!(zoom.on_viewport_signal(200.0), FreezeTransition::Extended);
        assert_eq!(zoom.frozen_width(), Some(432.0));
    }

    #[test]
    fn thaw_resets_state_once() {
        let mut zoom = ZoomFreeze::new();
        zoom.on_viewport_signal(432.0);

        assert!(zoom.thaw());
        assert_eq!(zoom.phase(), ZoomPhase::Normal);
        assert_eq!(zoom.layout_state(), LayoutState::normal());

        assert!(!zoom.thaw());
    }

    #[test]
    fn refreezing_after_thaw_captures_new_width() {
        let mut zoom = ZoomFreeze::new();
        zoom.on_viewport_signal(432.0);
        zoom.thaw();

        assert_eq!(zoom.on_viewport_signal(300.0), FreezeTransition::Entered);
        assert_eq!(zoom.frozen_width(), Some(300.0));
    }
}
