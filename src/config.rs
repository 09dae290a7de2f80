use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{ScrollyError, ScrollyResult};

/// Placeholder substituted with the 0-based frame index in a [`FramePath`] template.
pub const FRAME_INDEX_PLACEHOLDER: &str = "{index}";

/// Maps a 0-based frame index to a resource locator via a string template.
///
/// The default template `assets/sequence/frame_{index}.jpg` matches the staging convention of
/// sequentially numbered frames (`frame_0`, `frame_1`, ...).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct FramePath {
    template: String,
}

impl FramePath {
    /// Create a frame path from a template containing `{index}`.
    pub fn new(template: impl Into<String>) -> ScrollyResult<Self> {
        let out = Self {
            template: template.into(),
        };
        out.validate()?;
        Ok(out)
    }

    /// Return the raw template.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Resolve the locator for frame `index`.
    pub fn locate(&self, index: usize) -> String {
        self.template
            .replace(FRAME_INDEX_PLACEHOLDER, &index.to_string())
    }

    fn validate(&self) -> ScrollyResult<()> {
        if !self.template.contains(FRAME_INDEX_PLACEHOLDER) {
            return Err(ScrollyError::validation(format!(
                "frame_path template '{}' must contain '{FRAME_INDEX_PLACEHOLDER}'",
                self.template
            )));
        }
        Ok(())
    }
}

impl Default for FramePath {
    fn default() -> Self {
        Self {
            template: "assets/sequence/frame_{index}.jpg".to_string(),
        }
    }
}

/// One narrative beat: an overlay fully visible at the center of `[start, end]` and hidden at and
/// beyond the edges.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BeatSpec {
    /// Overlay identifier (`a`..`d` in the default layout).
    pub id: String,
    /// Scroll progress where the beat starts fading in.
    pub start: f64,
    /// Scroll progress where the beat has fully faded out.
    pub end: f64,
}

impl BeatSpec {
    /// Build a beat spec.
    pub fn new(id: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            id: id.into(),
            start,
            end,
        }
    }
}

/// Tail override for the closing beat: past `after`, the beat ramps in as
/// `clamp((progress - ramp_start) * ramp_gain, 0, 1)` and stays pinned at center.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FinalHold {
    /// Beat receiving the override.
    pub beat: String,
    /// Progress strictly above which the override applies.
    #[serde(default = "FinalHold::default_after")]
    pub after: f64,
    /// Progress where the ramp starts from zero.
    #[serde(default = "FinalHold::default_ramp_start")]
    pub ramp_start: f64,
    /// Ramp slope.
    #[serde(default = "FinalHold::default_ramp_gain")]
    pub ramp_gain: f64,
}

impl FinalHold {
    fn default_after() -> f64 {
        0.85
    }

    fn default_ramp_start() -> f64 {
        0.75
    }

    fn default_ramp_gain() -> f64 {
        5.0
    }

    /// Default hold on beat `beat`.
    pub fn on(beat: impl Into<String>) -> Self {
        Self {
            beat: beat.into(),
            after: Self::default_after(),
            ramp_start: Self::default_ramp_start(),
            ramp_gain: Self::default_ramp_gain(),
        }
    }
}

/// Immutable playback configuration.
///
/// This is the JSON-facing record; call [`StoryConfig::validate`] (done by every constructor that
/// consumes it) before use.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    /// Total number of frames in the sequence. Must be > 0.
    pub frame_count: u32,
    /// Frame index to locator mapping.
    pub frame_path: FramePath,
    /// Smoothing constant in `(0, 1]`; larger is snappier.
    pub lerp_factor: f64,
    /// Assumed scrollable height. Informational only; max scroll is always measured.
    pub scroll_height: f64,
    /// Overlay beats in display order.
    pub beats: Vec<BeatSpec>,
    /// Optional tail override for the closing beat.
    pub final_hold: Option<FinalHold>,
    /// Vertical slide distance (layout pixels) of a beat at zero intensity.
    pub slide_distance: f64,
    /// Beats at or below this intensity are hidden.
    pub visibility_epsilon: f64,
    /// Distance (scroll pixels) under which smoothing snaps to the target.
    pub snap_threshold: f64,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            frame_count: 192,
            frame_path: FramePath::default(),
            lerp_factor: 0.05,
            scroll_height: 5000.0,
            beats: vec![
                BeatSpec::new("a", 0.0, 0.20),
                BeatSpec::new("b", 0.25, 0.45),
                BeatSpec::new("c", 0.50, 0.70),
                BeatSpec::new("d", 0.75, 1.0),
            ],
            final_hold: Some(FinalHold::on("d")),
            slide_distance: 30.0,
            visibility_epsilon: 0.01,
            snap_threshold: 0.5,
        }
    }
}

impl StoryConfig {
    /// Parse a configuration from a JSON reader. Missing fields take their defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> ScrollyResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| ScrollyError::validation(format!("parse story config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ScrollyResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ScrollyError::validation(format!("open story config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check every invariant the engine relies on.
    pub fn validate(&self) -> ScrollyResult<()> {
        if self.frame_count == 0 {
            return Err(ScrollyError::validation("frame_count must be > 0"));
        }
        self.frame_path.validate()?;
        if !(self.lerp_factor.is_finite() && self.lerp_factor > 0.0 && self.lerp_factor <= 1.0) {
            return Err(ScrollyError::validation("lerp_factor must be in (0, 1]"));
        }
        for (name, v) in [
            ("slide_distance", self.slide_distance),
            ("visibility_epsilon", self.visibility_epsilon),
            ("snap_threshold", self.snap_threshold),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(ScrollyError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }

        let mut seen = HashSet::new();
        for beat in &self.beats {
            if !(beat.start.is_finite() && beat.end.is_finite()) || beat.start >= beat.end {
                return Err(ScrollyError::validation(format!(
                    "beat '{}' range must be finite with start < end",
                    beat.id
                )));
            }
            if !seen.insert(beat.id.as_str()) {
                return Err(ScrollyError::validation(format!(
                    "duplicate beat id '{}'",
                    beat.id
                )));
            }
        }

        if let Some(hold) = &self.final_hold {
            if !seen.contains(hold.beat.as_str()) {
                return Err(ScrollyError::validation(format!(
                    "final_hold refers to unknown beat '{}'",
                    hold.beat
                )));
            }
            if !(hold.after.is_finite() && hold.ramp_start.is_finite() && hold.ramp_gain.is_finite())
            {
                return Err(ScrollyError::validation(
                    "final_hold parameters must be finite",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
