use std::sync::{Arc, mpsc};
use std::time::Duration;

use crate::{
    assets::{FrameHandle, FrameImage, FrameSequence, source::FrameSource},
    config::FramePath,
    foundation::error::{ScrollyError, ScrollyResult},
};

/// Callback receiving the load progress fraction after every resolved frame.
pub type ProgressCallback = Box<dyn FnMut(f64)>;
/// Callback receiving the full ordered sequence once every frame has resolved.
pub type CompleteCallback = Box<dyn FnOnce(FrameSequence)>;

/// Options for [`AssetLoader`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LoaderOpts {
    /// Override the number of loader worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

/// Result of one load task, sent from a worker back to the owning thread.
struct LoadCompletion {
    index: usize,
    locator: String,
    outcome: ScrollyResult<FrameImage>,
}

/// Preloads a fixed-size ordered frame sequence with progress reporting.
///
/// [`AssetLoader::start`] fans out one load task per frame on a worker pool and returns
/// immediately. Workers never touch loader state; each sends exactly one completion message, and
/// the owning thread folds them in through [`AssetLoader::poll`] or [`AssetLoader::wait_for`].
/// Failed loads count toward completion so the batch always finishes.
pub struct AssetLoader {
    frame_count: usize,
    frame_path: FramePath,
    source: Arc<dyn FrameSource>,
    pool: rayon::ThreadPool,

    slots: Vec<Option<FrameHandle>>,
    loaded_count: usize,
    progress: f64,
    sequence: Option<FrameSequence>,

    on_progress: Option<ProgressCallback>,
    on_complete: Option<CompleteCallback>,

    rx: Option<mpsc::Receiver<LoadCompletion>>,
}

impl AssetLoader {
    /// Create a loader for `frame_count` frames located through `frame_path`.
    pub fn new(
        frame_count: usize,
        frame_path: FramePath,
        source: Arc<dyn FrameSource>,
        opts: LoaderOpts,
    ) -> ScrollyResult<Self> {
        if frame_count == 0 {
            return Err(ScrollyError::validation("frame_count must be > 0"));
        }
        Ok(Self {
            frame_count,
            frame_path,
            source,
            pool: build_thread_pool(opts.threads)?,
            slots: vec![None; frame_count],
            loaded_count: 0,
            progress: 0.0,
            sequence: None,
            on_progress: None,
            on_complete: None,
            rx: None,
        })
    }

    /// Register the progress callback, replacing any previous one.
    pub fn on_progress(&mut self, cb: impl FnMut(f64) + 'static) {
        self.on_progress = Some(Box::new(cb));
    }

    /// Register the completion callback, replacing any previous one.
    pub fn on_complete(&mut self, cb: impl FnOnce(FrameSequence) + 'static) {
        self.on_complete = Some(Box::new(cb));
    }

    /// Issue one concurrent load request per frame and return immediately.
    ///
    /// Calling `start` again is a no-op: each frame is requested at most once.
    #[tracing::instrument(skip(self), fields(frames = self.frame_count))]
    pub fn start(&mut self) {
        if self.rx.is_some() {
            tracing::warn!("asset loader already started");
            return;
        }

        let (tx, rx) = mpsc::channel::<LoadCompletion>();
        for index in 0..self.frame_count {
            let tx = tx.clone();
            let source = Arc::clone(&self.source);
            let locator = self.frame_path.locate(index);
            self.pool.spawn(move || {
                let outcome = source.load(&locator);
                // The receiver only goes away with the loader itself.
                let _ = tx.send(LoadCompletion {
                    index,
                    locator,
                    outcome,
                });
            });
        }
        self.rx = Some(rx);
        tracing::debug!("frame loads issued");
    }

    /// Fold in every completion that has already arrived, without blocking.
    ///
    /// Returns the number of frames resolved by this call.
    pub fn poll(&mut self) -> usize {
        let mut drained = Vec::new();
        if let Some(rx) = &self.rx {
            while let Ok(msg) = rx.try_recv() {
                drained.push(msg);
            }
        }
        let n = drained.len();
        for msg in drained {
            self.handle_load(msg);
        }
        n
    }

    /// Wait up to `timeout` for at least one completion, then fold in everything available.
    ///
    /// Returns the number of frames resolved by this call.
    pub fn wait_for(&mut self, timeout: Duration) -> usize {
        if self.is_complete() {
            return 0;
        }
        let first = match &self.rx {
            Some(rx) => rx.recv_timeout(timeout).ok(),
            None => None,
        };
        match first {
            Some(msg) => {
                self.handle_load(msg);
                1 + self.poll()
            }
            None => 0,
        }
    }

    /// Block until every frame has resolved and return the sequence.
    ///
    /// Starts the loader if it was not started yet.
    pub fn wait_until_complete(&mut self) -> ScrollyResult<FrameSequence> {
        if self.rx.is_none() {
            self.start();
        }
        while !self.is_complete() {
            let msg = self
                .rx
                .as_ref()
                .ok_or_else(|| ScrollyError::asset("asset loader is not running"))?
                .recv()
                .map_err(|_| {
                    ScrollyError::asset("frame load workers disconnected before completion")
                })?;
            self.handle_load(msg);
        }
        self.sequence
            .clone()
            .ok_or_else(|| ScrollyError::asset("frame sequence missing after completion"))
    }

    fn handle_load(&mut self, msg: LoadCompletion) {
        let Some(slot) = self.slots.get_mut(msg.index) else {
            tracing::warn!(index = msg.index, "completion for unknown frame index");
            return;
        };
        if slot.is_some() {
            tracing::warn!(index = msg.index, "duplicate completion ignored");
            return;
        }

        *slot = Some(match msg.outcome {
            Ok(img) => FrameHandle::Loaded(Arc::new(img)),
            Err(e) => {
                tracing::error!(locator = %msg.locator, error = %e, "failed to load frame image");
                FrameHandle::Failed {
                    locator: msg.locator,
                }
            }
        });

        self.loaded_count += 1;
        self.progress = self.loaded_count as f64 / self.frame_count as f64;

        if let Some(cb) = self.on_progress.as_mut() {
            cb(self.progress);
        }

        if self.loaded_count == self.frame_count {
            let frames = self
                .slots
                .iter_mut()
                .zip(0..)
                .map(|(slot, index)| {
                    slot.take().unwrap_or_else(|| FrameHandle::Failed {
                        locator: self.frame_path.locate(index),
                    })
                })
                .collect();
            let sequence = FrameSequence::new(frames);
            self.sequence = Some(sequence.clone());
            tracing::debug!(
                failed = sequence.failed_locators().len(),
                "frame sequence complete"
            );
            if let Some(cb) = self.on_complete.take() {
                cb(sequence);
            }
        }
    }

    /// Total frames requested.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Frames resolved so far (successes and failures).
    pub fn loaded_count(&self) -> usize {
        self.loaded_count
    }

    /// `loaded_count / frame_count`, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Return `true` once every frame has resolved.
    pub fn is_complete(&self) -> bool {
        self.sequence.is_some()
    }

    /// The completed sequence, if loading has finished.
    pub fn sequence(&self) -> Option<&FrameSequence> {
        self.sequence.as_ref()
    }
}

fn build_thread_pool(threads: Option<usize>) -> ScrollyResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ScrollyError::validation(
            "loader 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("frame-load-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ScrollyError::asset(format!("failed to build loader thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
