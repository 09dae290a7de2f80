use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    assets::{FrameImage, decode::decode_image},
    foundation::error::{ScrollyError, ScrollyResult},
};

/// Resolves a frame locator into a decoded image.
///
/// Implementations are called from loader worker threads, one call per frame, with no ordering
/// guarantee between calls.
pub trait FrameSource: Send + Sync {
    /// Load and decode the frame named by `locator`.
    fn load(&self, locator: &str) -> ScrollyResult<FrameImage>;
}

/// Frame source reading encoded images from a directory on disk.
#[derive(Clone, Debug)]
pub struct FsFrameSource {
    root: PathBuf,
}

impl FsFrameSource {
    /// Resolve locators relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Return the directory locators are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a locator to its on-disk path.
    pub fn resolve(&self, locator: &str) -> ScrollyResult<PathBuf> {
        let norm = normalize_rel_path(locator)?;
        Ok(self.root.join(Path::new(&norm)))
    }
}

impl FrameSource for FsFrameSource {
    fn load(&self, locator: &str) -> ScrollyResult<FrameImage> {
        let path = self.resolve(locator)?;
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read frame '{}'", path.display()))?;
        decode_image(&bytes)
    }
}

/// Normalize and validate frame locators as relative paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> ScrollyResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(ScrollyError::asset("frame locators must be relative"));
    }
    if s.is_empty() {
        return Err(ScrollyError::asset("frame locator must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(ScrollyError::asset("frame locators must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(ScrollyError::asset(
            "frame locator must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
