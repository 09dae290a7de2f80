use std::sync::{Arc, mpsc};
use std::time::Duration;

use crate::{
    assets::{
        FrameSequence,
        loader::{AssetLoader, LoaderOpts},
        source::FrameSource,
    },
    config::StoryConfig,
    foundation::core::{TickIndex, ViewportMetrics},
    foundation::error::ScrollyResult,
    render::{
        FrameRGBA,
        renderer::{Renderer, RendererOpts},
    },
    scroll::Scroller,
    story::{
        beats::{BeatAnimator, BeatState},
        frame_loop::{FrameClock, FrameLoop},
        view::StoryView,
    },
};

/// Controller lifecycle. `Loading` moves to `Ready` exactly once and never back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Frames are still resolving; nothing is drawn.
    Loading,
    /// Every frame resolved; each tick draws and animates overlays.
    Ready,
}

/// Input delivered to the control thread between ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StoryEvent {
    /// Raw vertical scroll offset of the page.
    Scroll(f64),
    /// The viewport or container was resized.
    Resize(ViewportMetrics),
}

enum LoaderSignal {
    Progress(f64),
    Complete(FrameSequence),
}

/// Options for [`StoryController`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ControllerOpts {
    /// Loader worker pool options.
    pub loader: LoaderOpts,
    /// Drawing surface options.
    pub renderer: RendererOpts,
}

/// What one tick did.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TickReport {
    /// Tick counter.
    pub tick: TickIndex,
    /// Phase after the tick ran.
    pub phase: Phase,
    /// Smoothed scroll progress, once ready.
    pub progress: Option<f64>,
    /// Frame slot selected for drawing, once ready.
    pub frame_index: Option<usize>,
    /// Whether pixels were painted this tick.
    pub drew: bool,
    /// Overlay styles applied this tick (empty while loading).
    pub beats: Vec<BeatState>,
}

/// Map smoothed progress onto a frame slot: `min(N - 1, floor(progress * N))`.
///
/// Progress outside `[0, 1]` (and NaN) is clamped first, so the result is always a valid index
/// for a non-empty sequence.
pub fn frame_index(progress: f64, frame_count: usize) -> usize {
    if frame_count == 0 {
        return 0;
    }
    let p = crate::foundation::math::clamp(progress, 0.0, 1.0);
    let raw = (p * frame_count as f64).floor() as usize;
    raw.min(frame_count - 1)
}

/// Owns the loader, renderer, scroller and overlay animator, and runs them once per tick.
///
/// All state lives on the thread that calls [`StoryController::tick`]. Loader callbacks only
/// post signals into a channel that the next tick drains.
pub struct StoryController<V: StoryView> {
    loader: AssetLoader,
    renderer: Renderer,
    scroller: Scroller,
    animator: BeatAnimator,
    view: V,

    signals: mpsc::Receiver<LoaderSignal>,
    phase: Phase,
    images: Option<FrameSequence>,
    tick: TickIndex,
}

impl<V: StoryView> StoryController<V> {
    /// Validate `config`, size the subsystems to `metrics`, and start loading frames.
    #[tracing::instrument(skip_all, fields(frames = config.frame_count))]
    pub fn new(
        config: &StoryConfig,
        source: Arc<dyn FrameSource>,
        metrics: &ViewportMetrics,
        view: V,
        opts: ControllerOpts,
    ) -> ScrollyResult<Self> {
        config.validate()?;

        let mut loader = AssetLoader::new(
            config.frame_count as usize,
            config.frame_path.clone(),
            source,
            opts.loader,
        )?;
        let renderer = Renderer::new(metrics, opts.renderer)?;
        let scroller =
            Scroller::with_snap_threshold(config.lerp_factor, config.snap_threshold, metrics)?;

        let (tx, signals) = mpsc::channel();
        let progress_tx = tx.clone();
        loader.on_progress(move |p| {
            let _ = progress_tx.send(LoaderSignal::Progress(p));
        });
        loader.on_complete(move |seq| {
            let _ = tx.send(LoaderSignal::Complete(seq));
        });
        loader.start();

        Ok(Self {
            loader,
            renderer,
            scroller,
            animator: BeatAnimator::from_config(config),
            view,
            signals,
            phase: Phase::Loading,
            images: None,
            tick: TickIndex(0),
        })
    }

    /// Apply one input event. Resize failures are logged, never surfaced.
    pub fn handle_event(&mut self, event: StoryEvent) {
        match event {
            StoryEvent::Scroll(offset) => self.scroller.on_scroll(offset),
            StoryEvent::Resize(metrics) => {
                if let Err(e) = self.renderer.resize(&metrics) {
                    tracing::warn!(error = %e, "renderer resize failed");
                }
                self.scroller.update_dimensions(&metrics);
            }
        }
    }

    /// Run one display refresh.
    pub fn tick(&mut self) -> TickReport {
        let tick = self.tick;
        self.tick = TickIndex(tick.0 + 1);

        if self.phase == Phase::Loading {
            self.loader.poll();
            self.drain_signals();
        }

        match (self.phase, self.images.clone()) {
            (Phase::Ready, Some(images)) => self.advance(tick, &images),
            _ => TickReport {
                tick,
                phase: self.phase,
                progress: None,
                frame_index: None,
                drew: false,
                beats: Vec::new(),
            },
        }
    }

    /// Block the calling thread until every frame has resolved, then reveal.
    pub fn block_until_ready(&mut self) -> ScrollyResult<()> {
        if self.phase == Phase::Ready {
            return Ok(());
        }
        self.loader.wait_until_complete()?;
        self.drain_signals();
        Ok(())
    }

    /// Tick at the cadence of `clock`, applying queued events before each tick, until the loop
    /// is cancelled or `events` disconnects.
    pub fn run<C: FrameClock + ?Sized>(
        &mut self,
        frame_loop: &FrameLoop,
        clock: &mut C,
        events: &mpsc::Receiver<StoryEvent>,
    ) -> u64 {
        frame_loop.run(clock, |_| {
            loop {
                match events.try_recv() {
                    Ok(event) => self.handle_event(event),
                    Err(mpsc::TryRecvError::Empty) => break,
                    Err(mpsc::TryRecvError::Disconnected) => {
                        return std::ops::ControlFlow::Break(());
                    }
                }
            }
            self.tick();
            std::ops::ControlFlow::Continue(())
        })
    }

    fn drain_signals(&mut self) {
        while let Ok(signal) = self.signals.try_recv() {
            match signal {
                LoaderSignal::Progress(p) => self.view.set_loader_progress(p),
                LoaderSignal::Complete(seq) => self.reveal(seq),
            }
        }
    }

    fn reveal(&mut self, images: FrameSequence) {
        if self.phase == Phase::Ready {
            return;
        }
        tracing::info!(
            frames = images.len(),
            failed = images.failed_locators().len(),
            "frames loaded, revealing story"
        );
        self.images = Some(images);
        self.phase = Phase::Ready;
        self.view.hide_loader();
        self.view.reveal_surface();
    }

    fn advance(&mut self, tick: TickIndex, images: &FrameSequence) -> TickReport {
        self.scroller.update();
        let p = self.scroller.progress();

        let index = frame_index(p, images.len());
        let drew = match self.renderer.draw(images.get(index)) {
            Ok(drew) => drew,
            Err(e) => {
                tracing::warn!(index, error = %e, "frame draw failed");
                false
            }
        };

        let beats = self.animator.styles(p);
        for beat in &beats {
            self.view.apply_beat(&beat.id, &beat.style);
        }

        TickReport {
            tick,
            phase: self.phase,
            progress: Some(p),
            frame_index: Some(index),
            drew,
            beats,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Return `true` once frames are loaded and revealed.
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Smoothed progress as of the last tick.
    pub fn progress(&self) -> f64 {
        self.scroller.progress()
    }

    /// Loaded frames, once ready.
    pub fn images(&self) -> Option<&FrameSequence> {
        self.images.as_ref()
    }

    /// Drawing surface.
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Scroll smoothing state.
    pub fn scroller(&self) -> &Scroller {
        &self.scroller
    }

    /// Frame loader.
    pub fn loader(&self) -> &AssetLoader {
        &self.loader
    }

    /// Page-side collaborator.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Mutable access to the page-side collaborator.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Read back the drawing surface.
    pub fn snapshot(&self) -> FrameRGBA {
        self.renderer.snapshot()
    }

    /// Wait up to `timeout` for outstanding frame loads and fold them in.
    ///
    /// Returns `true` once ready.
    pub fn wait_ready_for(&mut self, timeout: Duration) -> bool {
        if self.phase == Phase::Loading {
            self.loader.wait_for(timeout);
            self.drain_signals();
        }
        self.is_ready()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/story/controller.rs"]
mod tests;
