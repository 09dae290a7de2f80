pub(crate) mod decode;
pub(crate) mod loader;
pub(crate) mod source;

use std::sync::Arc;

/// Decoded frame image in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct FrameImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl FrameImage {
    /// Build an image filled with a single premultiplied color.
    pub fn solid(width: u32, height: u32, rgba8_premul: [u8; 4]) -> Self {
        let px = width as usize * height as usize;
        let mut data = Vec::with_capacity(px * 4);
        for _ in 0..px {
            data.extend_from_slice(&rgba8_premul);
        }
        Self {
            width,
            height,
            rgba8_premul: Arc::new(data),
        }
    }

    /// Return `true` when the image has no drawable area.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// One slot of the frame sequence: either a usable image or the gap left by a failed load.
#[derive(Clone, Debug)]
pub enum FrameHandle {
    /// Successfully decoded frame.
    Loaded(Arc<FrameImage>),
    /// Frame whose load failed; it stays a gap for the lifetime of the sequence.
    Failed {
        /// Locator that could not be loaded.
        locator: String,
    },
}

impl FrameHandle {
    /// Borrow the decoded image, or `None` for a failed slot.
    pub fn image(&self) -> Option<&Arc<FrameImage>> {
        match self {
            Self::Loaded(img) => Some(img),
            Self::Failed { .. } => None,
        }
    }

    /// Return `true` for a failed slot.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Ordered, shared, read-only frame sequence; index order is the animation's time axis.
#[derive(Clone, Debug)]
pub struct FrameSequence {
    frames: Arc<[FrameHandle]>,
}

impl FrameSequence {
    /// Wrap handles already in frame order.
    pub fn new(frames: Vec<FrameHandle>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    /// Number of slots (equal to the configured frame count).
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Return `true` when the sequence holds no slots.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Borrow slot `index`.
    pub fn get(&self, index: usize) -> Option<&FrameHandle> {
        self.frames.get(index)
    }

    /// Iterate slots in frame order.
    pub fn iter(&self) -> impl Iterator<Item = &FrameHandle> {
        self.frames.iter()
    }

    /// Locators of every failed slot, in frame order.
    pub fn failed_locators(&self) -> Vec<&str> {
        self.frames
            .iter()
            .filter_map(|f| match f {
                FrameHandle::Failed { locator } => Some(locator.as_str()),
                FrameHandle::Loaded(_) => None,
            })
            .collect()
    }
}
