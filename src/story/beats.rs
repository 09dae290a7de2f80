use crate::{
    config::{BeatSpec, FinalHold, StoryConfig},
    foundation::core::Vec2,
    foundation::math::clamp,
};

/// Whether an overlay takes part in compositing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Shown.
    Visible,
    /// Removed from compositing.
    Hidden,
}

/// Overlay transform on top of the fixed centering translate.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BeatTransform {
    /// Centered, then pushed down by `offset_y` layout pixels.
    Slide {
        /// Downward offset in layout pixels.
        offset_y: f64,
    },
    /// Pinned at pure center.
    Centered,
}

impl BeatTransform {
    /// Offset from the centered position in layout pixels.
    pub fn offset(self) -> Vec2 {
        match self {
            Self::Slide { offset_y } => Vec2::new(0.0, offset_y),
            Self::Centered => Vec2::ZERO,
        }
    }

    /// CSS `transform` value for the overlay element.
    pub fn css(self) -> String {
        match self {
            Self::Slide { offset_y } => format!("translate(-50%, calc(-50% + {offset_y}px))"),
            Self::Centered => "translate(-50%, -50%)".to_string(),
        }
    }
}

/// Visual state of one overlay for one tick.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BeatStyle {
    /// Opacity in `[0, 1]`; equals the beat's intensity.
    pub opacity: f64,
    /// Position relative to center.
    pub transform: BeatTransform,
    /// Compositing visibility.
    pub visibility: Visibility,
}

/// Computed style of a named beat.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BeatState {
    /// Beat identifier.
    pub id: String,
    /// Style to apply.
    pub style: BeatStyle,
}

/// Triangular falloff over `[start, end]`: 1 at the center, 0 at the edges and beyond.
pub fn beat_intensity(progress: f64, start: f64, end: f64) -> f64 {
    let center = (start + end) / 2.0;
    let half_range = (end - start) / 2.0;
    if half_range.is_nan() || half_range <= 0.0 {
        return 0.0;
    }
    clamp(1.0 - (progress - center).abs() / half_range, 0.0, 1.0)
}

/// Tail ramp of the held closing beat: `clamp((progress - ramp_start) * ramp_gain, 0, 1)`.
pub fn hold_intensity(progress: f64, hold: &FinalHold) -> f64 {
    clamp((progress - hold.ramp_start) * hold.ramp_gain, 0.0, 1.0)
}

/// Maps scroll progress to per-beat overlay styles.
#[derive(Clone, Debug)]
pub struct BeatAnimator {
    beats: Vec<BeatSpec>,
    hold: Option<FinalHold>,
    slide_distance: f64,
    visibility_epsilon: f64,
}

impl BeatAnimator {
    /// Build from a validated configuration.
    pub fn from_config(cfg: &StoryConfig) -> Self {
        Self {
            beats: cfg.beats.clone(),
            hold: cfg.final_hold.clone(),
            slide_distance: cfg.slide_distance,
            visibility_epsilon: cfg.visibility_epsilon,
        }
    }

    /// Beats in display order.
    pub fn beats(&self) -> &[BeatSpec] {
        &self.beats
    }

    /// Style of `beat` at `progress`, including the closing-beat hold when it applies.
    pub fn style_for(&self, beat: &BeatSpec, progress: f64) -> BeatStyle {
        if let Some(hold) = &self.hold
            && hold.beat == beat.id
            && progress > hold.after
        {
            return BeatStyle {
                opacity: hold_intensity(progress, hold),
                transform: BeatTransform::Centered,
                visibility: Visibility::Visible,
            };
        }

        let intensity = beat_intensity(progress, beat.start, beat.end);
        BeatStyle {
            opacity: intensity,
            transform: BeatTransform::Slide {
                offset_y: (1.0 - intensity) * self.slide_distance,
            },
            visibility: if intensity <= self.visibility_epsilon {
                Visibility::Hidden
            } else {
                Visibility::Visible
            },
        }
    }

    /// Styles of every beat at `progress`, in display order.
    pub fn styles(&self, progress: f64) -> Vec<BeatState> {
        self.beats
            .iter()
            .map(|beat| BeatState {
                id: beat.id.clone(),
                style: self.style_for(beat, progress),
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/story/beats.rs"]
mod tests;
