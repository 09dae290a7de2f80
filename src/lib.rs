//! Scrollytell plays a preloaded image sequence in step with page scroll.
//!
//! The engine is a small set of cooperating parts driven once per display refresh:
//!
//! - An [`AssetLoader`] fetches every frame concurrently and reports progress
//! - A [`Scroller`] smooths raw scroll offsets into progress in `[0, 1]`
//! - A [`Renderer`] draws the selected frame with a "contain" fit onto a density-aware surface
//! - A [`StoryController`] gates on loading, then maps progress onto frames and beat overlays
//!
//! Host pages feed geometry in as [`ViewportMetrics`] and receive visual writes through a
//! [`StoryView`]. [`play_script`] runs the same pipeline offline against a [`ScrollScript`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod config;
mod foundation;
mod playback;
mod render;
mod scroll;
mod story;

pub use crate::foundation::core::{
    Affine, LayoutBox, Rect, Rgba8Premul, TickIndex, Vec2, ViewportMetrics,
};
pub use crate::foundation::error::{ScrollyError, ScrollyResult};
pub use crate::foundation::math::{clamp, lerp};

pub use crate::assets::decode::decode_image;
pub use crate::assets::loader::{AssetLoader, CompleteCallback, LoaderOpts, ProgressCallback};
pub use crate::assets::source::{FrameSource, FsFrameSource, normalize_rel_path};
pub use crate::assets::{FrameHandle, FrameImage, FrameSequence};
pub use crate::config::{BeatSpec, FRAME_INDEX_PLACEHOLDER, FinalHold, FramePath, StoryConfig};
pub use crate::playback::{
    FrameSink, InMemorySink, PlaybackStats, PngSequenceSink, ScriptEvent, ScrollScript,
    SinkConfig, play_script,
};
pub use crate::render::FrameRGBA;
pub use crate::render::fit::{Placement, contain};
pub use crate::render::renderer::{Renderer, RendererOpts};
pub use crate::scroll::{DEFAULT_SNAP_THRESHOLD, Scroller};
pub use crate::story::beats::{
    BeatAnimator, BeatState, BeatStyle, BeatTransform, Visibility, beat_intensity, hold_intensity,
};
pub use crate::story::controller::{
    ControllerOpts, Phase, StoryController, StoryEvent, TickReport, frame_index,
};
pub use crate::story::frame_loop::{
    CancelHandle, FrameClock, FrameLoop, FrameTick, IntervalClock, ManualClock,
};
pub use crate::story::view::{RecordingView, StoryView};
