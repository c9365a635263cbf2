// SPDX-License-Identifier: GPL-3.0-only

//! Still image frame source
//!
//! Loads an image file once and serves it as the "live" frame, scaled to
//! whatever size the pipeline requests.

use crate::backends::camera::FrameSource;
use crate::backends::camera::types::{FrameResult, PixelBuffer};
use crate::constants::file_formats;
use crate::errors::FrameError;
use image::imageops::{self, FilterType};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, info};

/// Load an image file as an RGBA frame
pub fn load_image_as_frame(path: &Path) -> FrameResult<PixelBuffer> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !file_formats::is_image_extension(&extension) {
        return Err(FrameError::Backend(format!(
            "Unsupported file format: {}",
            extension
        )));
    }

    info!(path = %path.display(), "Loading image file");

    let img = image::open(path).map_err(|e| {
        FrameError::Backend(format!("Failed to load image '{}': {}", path.display(), e))
    })?;

    let frame = PixelBuffer::from(img.to_rgba8());
    info!(
        width = frame.width(),
        height = frame.height(),
        "Image loaded successfully"
    );

    Ok(frame)
}

/// Frame source that serves a single still frame
///
/// The source can be marked unavailable to simulate a disconnected camera;
/// captures then fail with [`FrameError::Disconnected`].
pub struct StillImageSource {
    frame: PixelBuffer,
    available: AtomicBool,
    frames_served: AtomicUsize,
}

impl StillImageSource {
    /// Serve the given buffer as the live frame
    pub fn new(frame: PixelBuffer) -> Self {
        Self {
            frame,
            available: AtomicBool::new(true),
            frames_served: AtomicUsize::new(0),
        }
    }

    /// Serve the image at `path` as the live frame
    pub fn open(path: &Path) -> FrameResult<Self> {
        load_image_as_frame(path).map(Self::new)
    }

    /// Mark the source as connected or disconnected
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of frames handed out so far
    pub fn frames_served(&self) -> usize {
        self.frames_served.load(Ordering::SeqCst)
    }
}

impl FrameSource for StillImageSource {
    fn resolution(&self) -> (u32, u32) {
        self.frame.dimensions()
    }

    fn capture_frame(&self, width: u32, height: u32) -> FrameResult<PixelBuffer> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(FrameError::Disconnected);
        }
        if width == 0 || height == 0 {
            return Err(FrameError::NoFrameAvailable);
        }

        let frame = if self.frame.dimensions() == (width, height) {
            self.frame.clone()
        } else {
            debug!(
                from_width = self.frame.width(),
                from_height = self.frame.height(),
                width,
                height,
                "Scaling still frame"
            );
            let image = self.frame.clone().into_rgba_image();
            PixelBuffer::from(imageops::resize(&image, width, height, FilterType::Triangle))
        };

        self.frames_served.fetch_add(1, Ordering::SeqCst);
        Ok(frame)
    }
}
