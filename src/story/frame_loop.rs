use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::{
    foundation::core::TickIndex,
    foundation::error::{ScrollyError, ScrollyResult},
};

/// One display refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTick {
    /// Tick counter, starting at 0.
    pub index: TickIndex,
    /// Time since the clock's first tick.
    pub elapsed: Duration,
    /// Time since the previous tick (zero on the first).
    pub delta: Duration,
}

/// Source of display refreshes. The loop runs at whatever cadence the clock delivers.
pub trait FrameClock {
    /// Wait for the next refresh and describe it.
    fn next_frame(&mut self) -> FrameTick;
}

/// Wall-clock pacing at a target refresh rate.
///
/// Late ticks are not made up: after a stall the next deadline is measured from now.
#[derive(Debug)]
pub struct IntervalClock {
    interval: Duration,
    start: Option<Instant>,
    last: Option<Instant>,
    next_deadline: Option<Instant>,
    count: u64,
}

impl IntervalClock {
    /// Pace ticks at `refresh_hz`.
    pub fn new(refresh_hz: f64) -> ScrollyResult<Self> {
        if !refresh_hz.is_finite() || refresh_hz <= 0.0 {
            return Err(ScrollyError::validation("refresh rate must be finite and > 0"));
        }
        Ok(Self {
            interval: Duration::from_secs_f64(1.0 / refresh_hz),
            start: None,
            last: None,
            next_deadline: None,
            count: 0,
        })
    }

    /// Tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl FrameClock for IntervalClock {
    fn next_frame(&mut self) -> FrameTick {
        if let Some(deadline) = self.next_deadline {
            let now = Instant::now();
            if deadline > now {
                std::thread::sleep(deadline - now);
            }
        }
        let now = Instant::now();
        let start = *self.start.get_or_insert(now);
        let delta = self.last.map(|l| now - l).unwrap_or_default();
        self.last = Some(now);
        self.next_deadline = Some(now + self.interval);

        let tick = FrameTick {
            index: TickIndex(self.count),
            elapsed: now - start,
            delta,
        };
        self.count += 1;
        tick
    }
}

/// Clock that advances synthetic time by a fixed step without waiting.
#[derive(Clone, Debug)]
pub struct ManualClock {
    step: Duration,
    count: u64,
}

impl ManualClock {
    /// Advance by `step` per tick.
    pub fn new(step: Duration) -> Self {
        Self { step, count: 0 }
    }

    /// Ticks delivered so far.
    pub fn ticks(&self) -> u64 {
        self.count
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Duration::from_micros(16_667))
    }
}

impl FrameClock for ManualClock {
    fn next_frame(&mut self) -> FrameTick {
        let index = self.count;
        self.count += 1;
        let steps = u32::try_from(index).unwrap_or(u32::MAX);
        FrameTick {
            index: TickIndex(index),
            elapsed: self.step.saturating_mul(steps),
            delta: if index == 0 { Duration::ZERO } else { self.step },
        }
    }
}

/// Shared flag that stops a running [`FrameLoop`] before its next tick.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Return `true` once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Recurring per-refresh task.
#[derive(Debug, Default)]
pub struct FrameLoop {
    cancel: CancelHandle,
}

impl FrameLoop {
    /// Create a loop that runs until cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for cancelling the loop from teardown code.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Call `on_frame` once per clock tick until cancelled or the callback breaks.
    ///
    /// Returns the number of ticks delivered.
    pub fn run<C: FrameClock + ?Sized>(
        &self,
        clock: &mut C,
        mut on_frame: impl FnMut(FrameTick) -> ControlFlow<()>,
    ) -> u64 {
        let mut ran = 0;
        while !self.cancel.is_cancelled() {
            let tick = clock.next_frame();
            ran += 1;
            if on_frame(tick).is_break() {
                break;
            }
        }
        ran
    }
}

#[cfg(test)]
#[path = "../../tests/unit/story/frame_loop.rs"]
mod tests;
