//! Offline, deterministic playback of scripted scroll input.

use std::fs::File;
use std::io::BufReader;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    foundation::core::ViewportMetrics,
    foundation::error::{ScrollyError, ScrollyResult},
    render::FrameRGBA,
    story::{
        controller::{StoryController, StoryEvent, TickReport},
        frame_loop::{FrameLoop, ManualClock},
        view::StoryView,
    },
};

/// One scripted input, applied before the tick it names runs.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// Set the raw scroll offset.
    Scroll {
        /// Tick the event fires on.
        at_tick: u64,
        /// Raw vertical offset.
        offset: f64,
    },
    /// Change viewport geometry.
    Resize {
        /// Tick the event fires on.
        at_tick: u64,
        /// New geometry.
        viewport: ViewportMetrics,
    },
}

impl ScriptEvent {
    /// Tick the event fires on.
    pub fn at_tick(&self) -> u64 {
        match self {
            Self::Scroll { at_tick, .. } | Self::Resize { at_tick, .. } => *at_tick,
        }
    }

    fn to_story_event(&self) -> StoryEvent {
        match self {
            Self::Scroll { offset, .. } => StoryEvent::Scroll(*offset),
            Self::Resize { viewport, .. } => StoryEvent::Resize(*viewport),
        }
    }
}

/// Scroll input recorded against a tick counter.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScrollScript {
    /// Geometry at tick 0.
    pub viewport: ViewportMetrics,
    /// Number of ticks to run.
    pub ticks: u64,
    /// Inputs, in any order. Events sharing a tick apply in listed order.
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

impl ScrollScript {
    /// Parse a script from JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> ScrollyResult<Self> {
        let script: Self = serde_json::from_reader(r)
            .map_err(|e| ScrollyError::validation(format!("parse scroll script JSON: {e}")))?;
        script.validate()?;
        Ok(script)
    }

    /// Parse a script from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ScrollyResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ScrollyError::validation(format!("open scroll script '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check tick bounds and numeric sanity.
    pub fn validate(&self) -> ScrollyResult<()> {
        if self.ticks == 0 {
            return Err(ScrollyError::validation("script ticks must be > 0"));
        }
        for (i, ev) in self.events.iter().enumerate() {
            if ev.at_tick() >= self.ticks {
                return Err(ScrollyError::validation(format!(
                    "event {i} fires at tick {} but the script only runs {} ticks",
                    ev.at_tick(),
                    self.ticks
                )));
            }
            if let ScriptEvent::Scroll { offset, .. } = ev
                && !offset.is_finite()
            {
                return Err(ScrollyError::validation(format!(
                    "event {i} scroll offset must be finite"
                )));
            }
        }
        Ok(())
    }

    fn events_by_tick(&self) -> Vec<&ScriptEvent> {
        let mut events: Vec<&ScriptEvent> = self.events.iter().collect();
        events.sort_by_key(|e| e.at_tick());
        events
    }
}

/// Configuration handed to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Initial surface width in device pixels.
    pub width: u32,
    /// Initial surface height in device pixels.
    pub height: u32,
    /// Ticks the run will push.
    pub ticks: u64,
}

/// Consumer of rendered ticks.
///
/// `push_frame` is called once per tick in increasing tick order. A resize may change the frame
/// size between calls.
pub trait FrameSink {
    /// Called once before the first frame.
    fn begin(&mut self, cfg: SinkConfig) -> ScrollyResult<()>;
    /// Called once per tick.
    fn push_frame(&mut self, frame: &FrameRGBA, report: &TickReport) -> ScrollyResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> ScrollyResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    /// Frames and reports in tick order.
    pub frames: Vec<(FrameRGBA, TickReport)>,
    ended: bool,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration received in `begin`.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Return `true` after `end` was called.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ScrollyResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRGBA, report: &TickReport) -> ScrollyResult<()> {
        self.frames.push((frame.clone(), report.clone()));
        Ok(())
    }

    fn end(&mut self) -> ScrollyResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Writes `tick_00000.png`, `tick_00001.png`, ... plus an `overlays.json` log of every report.
#[derive(Debug)]
pub struct PngSequenceSink {
    out_dir: PathBuf,
    reports: Vec<TickReport>,
    written: usize,
}

impl PngSequenceSink {
    /// Write into `out_dir`, creating it on `begin`.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            reports: Vec::new(),
            written: 0,
        }
    }

    /// PNG files written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Path of the PNG for the `n`th pushed tick.
    pub fn frame_path(&self, n: usize) -> PathBuf {
        self.out_dir.join(format!("tick_{n:05}.png"))
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, _cfg: SinkConfig) -> ScrollyResult<()> {
        std::fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("create output dir '{}'", self.out_dir.display()))?;
        self.reports.clear();
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRGBA, report: &TickReport) -> ScrollyResult<()> {
        let n = self.reports.len();
        self.reports.push(report.clone());
        if frame.width == 0 || frame.height == 0 {
            tracing::debug!(tick = report.tick.0, "surface has no area, png skipped");
            return Ok(());
        }

        let path = self.frame_path(n);
        image::save_buffer_with_format(
            &path,
            &frame.to_straight_rgba(),
            frame.width,
            frame.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> ScrollyResult<()> {
        let path = self.out_dir.join("overlays.json");
        let f = File::create(&path)
            .with_context(|| format!("create overlay log '{}'", path.display()))?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(f), &self.reports)
            .with_context(|| format!("write overlay log '{}'", path.display()))?;
        Ok(())
    }
}

/// Summary of a scripted run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    /// Ticks run.
    pub ticks: u64,
    /// Ticks that painted pixels.
    pub frames_drawn: u64,
    /// Ticks whose selected frame slot differed from the previous tick's.
    pub frame_changes: u64,
}

/// Wait for every frame to load, then run `script` tick by tick and push each result into `sink`.
#[tracing::instrument(skip_all, fields(ticks = script.ticks, events = script.events.len()))]
pub fn play_script<V: StoryView>(
    controller: &mut StoryController<V>,
    script: &ScrollScript,
    sink: &mut dyn FrameSink,
) -> ScrollyResult<PlaybackStats> {
    script.validate()?;
    controller.block_until_ready()?;
    controller.handle_event(StoryEvent::Resize(script.viewport));

    let (width, height) = controller.renderer().backing_size();
    sink.begin(SinkConfig {
        width,
        height,
        ticks: script.ticks,
    })?;

    let events = script.events_by_tick();
    let mut next_event = 0;
    let mut stats = PlaybackStats::default();
    let mut last_index: Option<usize> = None;
    let mut failure: Option<ScrollyError> = None;

    let mut clock = ManualClock::default();
    FrameLoop::new().run(&mut clock, |tick| {
        if tick.index.0 >= script.ticks {
            return ControlFlow::Break(());
        }
        while let Some(ev) = events.get(next_event)
            && ev.at_tick() <= tick.index.0
        {
            controller.handle_event(ev.to_story_event());
            next_event += 1;
        }

        let report = controller.tick();
        stats.ticks += 1;
        if report.drew {
            stats.frames_drawn += 1;
        }
        if report.frame_index != last_index && last_index.is_some() {
            stats.frame_changes += 1;
        }
        last_index = report.frame_index;

        match sink.push_frame(&controller.snapshot(), &report) {
            Ok(()) => ControlFlow::Continue(()),
            Err(e) => {
                failure = Some(e);
                ControlFlow::Break(())
            }
        }
    });

    if let Some(e) = failure {
        return Err(e);
    }
    sink.end()?;
    tracing::info!(
        ticks = stats.ticks,
        drawn = stats.frames_drawn,
        changes = stats.frame_changes,
        "playback finished"
    );
    Ok(stats)
}

#[cfg(test)]
#[path = "../tests/unit/playback.rs"]
mod tests;
