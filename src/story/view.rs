use std::collections::BTreeMap;

use crate::story::beats::BeatStyle;

/// Page-side collaborator that receives every visual write the controller makes.
///
/// Implementations map these onto real elements: a loading indicator with a progress fill, the
/// drawing surface, and one overlay element per beat.
pub trait StoryView {
    /// Loader progress fill, as a fraction in `[0, 1]`.
    fn set_loader_progress(&mut self, fraction: f64);
    /// Hide the loading indicator.
    fn hide_loader(&mut self);
    /// Reveal the drawing surface.
    fn reveal_surface(&mut self);
    /// Apply opacity, transform, and visibility to overlay `id`.
    fn apply_beat(&mut self, id: &str, style: &BeatStyle);
}

/// View that records the latest state of every element.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct RecordingView {
    /// Last loader progress fraction written.
    pub loader_progress: f64,
    /// Whether the loader has been hidden.
    pub loader_hidden: bool,
    /// Whether the surface has been revealed.
    pub surface_visible: bool,
    /// Latest style per overlay.
    pub beats: BTreeMap<String, BeatStyle>,
    /// Number of loader progress writes.
    pub progress_writes: usize,
}

impl RecordingView {
    /// Create an empty recording view.
    pub fn new() -> Self {
        Self::default()
    }

    /// CSS width of the loader progress fill, e.g. `"42%"`.
    pub fn loader_fill_width(&self) -> String {
        format!("{}%", self.loader_progress * 100.0)
    }
}

impl StoryView for RecordingView {
    fn set_loader_progress(&mut self, fraction: f64) {
        self.loader_progress = fraction;
        self.progress_writes += 1;
    }

    fn hide_loader(&mut self) {
        self.loader_hidden = true;
    }

    fn reveal_surface(&mut self) {
        self.surface_visible = true;
    }

    fn apply_beat(&mut self, id: &str, style: &BeatStyle) {
        self.beats.insert(id.to_string(), *style);
    }
}
