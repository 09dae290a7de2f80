use crate::{
    foundation::core::ViewportMetrics,
    foundation::error::{ScrollyError, ScrollyResult},
    foundation::math::{clamp, lerp},
};

/// Default distance (scroll pixels) under which smoothing snaps onto the target.
pub const DEFAULT_SNAP_THRESHOLD: f64 = 0.5;

/// Converts raw scroll offsets into a smoothed, normalized progress value in `[0, 1]`.
///
/// Scroll events only record the target; all smoothing happens in [`Scroller::update`], which is
/// called once per animation tick whether or not a new event arrived.
#[derive(Clone, Debug)]
pub struct Scroller {
    factor: f64,
    snap_threshold: f64,

    target_position: f64,
    current_position: f64,
    max_scroll: f64,
    progress: f64,
}

impl Scroller {
    /// Create a scroller with smoothing `factor` in `(0, 1]`, measuring `metrics` immediately.
    pub fn new(factor: f64, metrics: &ViewportMetrics) -> ScrollyResult<Self> {
        Self::with_snap_threshold(factor, DEFAULT_SNAP_THRESHOLD, metrics)
    }

    /// Like [`Scroller::new`] with an explicit snap threshold.
    pub fn with_snap_threshold(
        factor: f64,
        snap_threshold: f64,
        metrics: &ViewportMetrics,
    ) -> ScrollyResult<Self> {
        if !(factor.is_finite() && factor > 0.0 && factor <= 1.0) {
            return Err(ScrollyError::validation("smoothing factor must be in (0, 1]"));
        }
        if !snap_threshold.is_finite() || snap_threshold < 0.0 {
            return Err(ScrollyError::validation(
                "snap threshold must be finite and >= 0",
            ));
        }
        let mut out = Self {
            factor,
            snap_threshold,
            target_position: 0.0,
            current_position: 0.0,
            max_scroll: 0.0,
            progress: 0.0,
        };
        out.update_dimensions(metrics);
        Ok(out)
    }

    /// Recompute the scrollable range: container scroll height minus viewport height.
    ///
    /// The result may be zero or negative when content is shorter than the viewport.
    pub fn update_dimensions(&mut self, metrics: &ViewportMetrics) {
        self.max_scroll = metrics.scroll_height - metrics.viewport_height;
    }

    /// Record the latest raw scroll offset. No smoothing happens here.
    pub fn on_scroll(&mut self, offset: f64) {
        if offset.is_finite() {
            self.target_position = offset;
        }
    }

    /// Advance smoothing by one tick and recompute progress.
    pub fn update(&mut self) {
        self.current_position = lerp(self.current_position, self.target_position, self.factor);

        if (self.target_position - self.current_position).abs() < self.snap_threshold {
            self.current_position = self.target_position;
        }

        self.progress = if self.max_scroll > 0.0 {
            clamp(self.current_position / self.max_scroll, 0.0, 1.0)
        } else {
            0.0
        };
    }

    /// Smoothed progress in `[0, 1]` as of the last [`Scroller::update`].
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Latest raw scroll offset.
    pub fn target_position(&self) -> f64 {
        self.target_position
    }

    /// Smoothed scroll offset.
    pub fn current_position(&self) -> f64 {
        self.current_position
    }

    /// Measured scrollable range.
    pub fn max_scroll(&self) -> f64 {
        self.max_scroll
    }

    /// Return `true` while the smoothed position is still converging.
    pub fn is_settling(&self) -> bool {
        self.current_position != self.target_position
    }
}

#[cfg(test)]
#[path = "../tests/unit/scroll.rs"]
mod tests;
