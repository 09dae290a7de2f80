use std::collections::HashSet;

use super::*;
use crate::assets::FrameImage;
use crate::config::FramePath;
use crate::foundation::error::ScrollyError;
use crate::story::beats::Visibility;
use crate::story::view::RecordingView;

/// Frame `i` is a solid 4x4 image with red channel `i * 10`.
struct IndexedSource {
    fail: HashSet<usize>,
}

impl FrameSource for IndexedSource {
    fn load(&self, locator: &str) -> ScrollyResult<FrameImage> {
        let index: usize = locator
            .trim_start_matches("f_")
            .parse()
            .map_err(|_| ScrollyError::asset(format!("bad locator {locator}")))?;
        if self.fail.contains(&index) {
            return Err(ScrollyError::asset(format!("missing {locator}")));
        }
        Ok(FrameImage::solid(4, 4, [(index * 10) as u8, 0, 0, 255]))
    }
}

fn config(frames: u32) -> StoryConfig {
    StoryConfig {
        frame_count: frames,
        frame_path: FramePath::new("f_{index}").unwrap(),
        lerp_factor: 1.0,
        ..StoryConfig::default()
    }
}

fn metrics() -> ViewportMetrics {
    // max scroll = 1008 - 8 = 1000
    ViewportMetrics::fullscreen(8.0, 8.0, 1008.0)
}

fn controller(frames: u32, fail: &[usize]) -> StoryController<RecordingView> {
    let source = Arc::new(IndexedSource {
        fail: fail.iter().copied().collect(),
    });
    let opts = ControllerOpts {
        loader: LoaderOpts { threads: Some(2) },
        ..ControllerOpts::default()
    };
    StoryController::new(&config(frames), source, &metrics(), RecordingView::new(), opts).unwrap()
}

fn ready(frames: u32, fail: &[usize]) -> StoryController<RecordingView> {
    let mut c = controller(frames, fail);
    c.block_until_ready().unwrap();
    c
}

fn red_at_center(c: &StoryController<RecordingView>) -> u8 {
    c.snapshot().pixel(4, 4).unwrap()[0]
}

#[test]
fn frame_index_maps_progress_onto_slots() {
    assert_eq!(frame_index(0.0, 192), 0);
    assert_eq!(frame_index(1.0, 192), 191);
    assert_eq!(frame_index(0.5, 192), 96);
    assert_eq!(frame_index(0.999, 4), 3);
    assert_eq!(frame_index(-0.5, 4), 0);
    assert_eq!(frame_index(f64::NAN, 4), 0);
    assert_eq!(frame_index(0.3, 0), 0);

    let mut last = 0;
    for step in 0..=1000 {
        let i = frame_index(step as f64 / 1000.0, 192);
        assert!(i < 192);
        assert!(i >= last, "index must not decrease");
        last = i;
    }
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = StoryConfig {
        frame_count: 0,
        ..config(1)
    };
    let source = Arc::new(IndexedSource {
        fail: HashSet::new(),
    });
    let res = StoryController::new(
        &cfg,
        source,
        &metrics(),
        RecordingView::new(),
        ControllerOpts::default(),
    );
    assert!(res.is_err());
}

#[test]
fn loading_phase_draws_nothing_then_reveals_once() {
    let mut c = controller(6, &[]);
    assert_eq!(c.phase(), Phase::Loading);
    assert!(!c.view().loader_hidden);
    assert!(!c.view().surface_visible);

    let mut reports = Vec::new();
    for _ in 0..10_000 {
        if c.wait_ready_for(Duration::from_millis(50)) {
            break;
        }
        reports.push(c.tick());
    }
    for r in &reports {
        assert_eq!(r.phase, Phase::Loading);
        assert!(!r.drew);
        assert!(r.beats.is_empty());
    }
    assert!(c.is_ready());

    let view = c.view();
    assert!(view.loader_hidden);
    assert!(view.surface_visible);
    assert_eq!(view.loader_progress, 1.0);
    assert_eq!(view.loader_fill_width(), "100%");
    assert_eq!(view.progress_writes, 6);
    assert!(view.beats.is_empty());
}

#[test]
fn ready_tick_draws_and_applies_every_beat() {
    let mut c = ready(4, &[]);
    let r = c.tick();
    assert_eq!(r.phase, Phase::Ready);
    assert_eq!(r.progress, Some(0.0));
    assert_eq!(r.frame_index, Some(0));
    assert!(r.drew);
    assert_eq!(r.beats.len(), 4);
    assert_eq!(red_at_center(&c), 0);

    let view = c.view();
    assert_eq!(view.beats.len(), 4);
    // At progress 0 beat "a" sits at its lower edge.
    assert_eq!(view.beats["a"].visibility, Visibility::Hidden);
    assert_eq!(view.beats["d"].visibility, Visibility::Hidden);
}

#[test]
fn scrolling_selects_frames_and_final_hold() {
    let mut c = ready(4, &[]);
    c.tick();

    c.handle_event(StoryEvent::Scroll(500.0));
    let r = c.tick();
    assert_eq!(r.progress, Some(0.5));
    assert_eq!(r.frame_index, Some(2));
    assert_eq!(red_at_center(&c), 20);

    c.handle_event(StoryEvent::Scroll(900.0));
    let r = c.tick();
    assert_eq!(r.frame_index, Some(3));
    let d = &c.view().beats["d"];
    assert!((d.opacity - 0.75).abs() < 1e-9);
    assert_eq!(d.visibility, Visibility::Visible);

    // Past the end clamps to the last frame.
    c.handle_event(StoryEvent::Scroll(5000.0));
    let r = c.tick();
    assert_eq!(r.progress, Some(1.0));
    assert_eq!(r.frame_index, Some(3));
}

#[test]
fn failed_frame_keeps_previous_frame_visible() {
    let mut c = ready(4, &[2]);
    assert_eq!(c.images().unwrap().failed_locators(), vec!["f_2"]);

    c.handle_event(StoryEvent::Scroll(250.0));
    let r = c.tick();
    assert_eq!(r.frame_index, Some(1));
    assert!(r.drew);
    assert_eq!(red_at_center(&c), 10);

    c.handle_event(StoryEvent::Scroll(500.0));
    let r = c.tick();
    assert_eq!(r.frame_index, Some(2));
    assert!(!r.drew);
    assert_eq!(red_at_center(&c), 10);
}

#[test]
fn resize_updates_surface_and_scroll_range() {
    let mut c = ready(4, &[]);
    c.tick();

    let bigger = ViewportMetrics::fullscreen(16.0, 10.0, 2010.0).with_dpr(2.0);
    c.handle_event(StoryEvent::Resize(bigger));
    assert_eq!(c.renderer().backing_size(), (32, 20));
    assert_eq!(c.scroller().max_scroll(), 2000.0);

    c.handle_event(StoryEvent::Scroll(1000.0));
    assert_eq!(c.tick().progress, Some(0.5));
}

#[test]
fn oversized_resize_is_logged_not_fatal() {
    let mut c = ready(2, &[]);
    c.handle_event(StoryEvent::Resize(ViewportMetrics::fullscreen(
        70_000.0, 10.0, 100.0,
    )));
    assert_eq!(c.tick().phase, Phase::Ready);
}

#[test]
fn run_stops_when_events_disconnect() {
    let mut c = ready(4, &[]);
    let (tx, rx) = mpsc::channel();
    tx.send(StoryEvent::Scroll(1000.0)).unwrap();
    drop(tx);

    let mut clock = crate::story::frame_loop::ManualClock::default();
    let ran = c.run(&FrameLoop::new(), &mut clock, &rx);
    assert_eq!(ran, 1);
    assert_eq!(c.scroller().target_position(), 1000.0);
}

#[test]
fn run_ticks_until_cancelled() {
    let mut c = ready(4, &[]);
    let (tx, rx) = mpsc::channel::<StoryEvent>();
    let frame_loop = FrameLoop::new();
    let cancel = frame_loop.cancel_handle();

    struct CancelAfter {
        inner: crate::story::frame_loop::ManualClock,
        cancel: crate::story::frame_loop::CancelHandle,
        after: u64,
    }
    impl FrameClock for CancelAfter {
        fn next_frame(&mut self) -> crate::story::frame_loop::FrameTick {
            let t = self.inner.next_frame();
            if t.index.0 + 1 >= self.after {
                self.cancel.cancel();
            }
            t
        }
    }

    let mut clock = CancelAfter {
        inner: Default::default(),
        cancel,
        after: 3,
    };
    let ran = c.run(&frame_loop, &mut clock, &rx);
    assert_eq!(ran, 3);
    drop(tx);
}
