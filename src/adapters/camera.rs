//! File-backed video source.
//!
//! Serves one decoded image as a perpetual "live" stream — enough to run
//! the whole session pipeline on a host without camera hardware, and the
//! standard source for demos and manual testing.

use std::path::Path;

use anyhow::Context;
use image::RgbImage;

use crate::capture::VideoSource;

pub struct StillImageSource {
    frame: Option<RgbImage>,
}

impl StillImageSource {
    /// Load an image from disk and serve it as the stream.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let frame = image::open(path)
            .with_context(|| format!("failed to load frame image {}", path.display()))?
            .into_rgb8();
        Ok(Self { frame: Some(frame) })
    }

    /// A source that never becomes ready — a camera that failed to start.
    pub fn unavailable() -> Self {
        Self { frame: None }
    }
}

impl VideoSource for StillImageSource {
    fn dimensions(&self) -> Option<(u32, u32)> {
        self.frame.as_ref().map(|f| (f.width(), f.height()))
    }

    fn latest_frame(&mut self) -> Option<RgbImage> {
        self.frame.clone()
    }
}
