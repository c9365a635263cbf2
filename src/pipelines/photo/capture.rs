// SPDX-License-Identifier: GPL-3.0-only

//! Single frame acquisition
//!
//! Grabs one frame from a [`FrameSource`] at the source's own resolution.

use crate::backends::camera::{FrameSource, PixelBuffer};
use crate::errors::FrameError;
use tracing::{debug, info};

/// Photo capture handler
pub struct PhotoCapture;

impl PhotoCapture {
    /// Capture one frame at the source's native resolution
    pub fn capture_from_source<S>(source: &S) -> Result<PixelBuffer, FrameError>
    where
        S: FrameSource + ?Sized,
    {
        let (width, height) = source.resolution();
        info!(width, height, "Capturing photo from frame source");

        let frame = source.capture_frame(width, height)?;

        debug!(
            width = frame.width(),
            height = frame.height(),
            "Frame captured from source"
        );
        Ok(frame)
    }

    /// Frame size a capture from `source` would have
    pub fn capture_size<S>(source: &S) -> Result<(u32, u32), FrameError>
    where
        S: FrameSource + ?Sized,
    {
        match source.resolution() {
            (0, _) | (_, 0) => Err(FrameError::NoFrameAvailable),
            size => Ok(size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_camera::StillImageSource;

    #[test]
    fn test_captures_at_native_size() {
        let source = StillImageSource::new(PixelBuffer::filled(6, 4, [1, 2, 3, 255]));
        let frame = PhotoCapture::capture_from_source(&source).unwrap();
        assert_eq!(frame.dimensions(), (6, 4));
        assert_eq!(source.frames_served(), 1);
    }

    #[test]
    fn test_unavailable_source() {
        let source = StillImageSource::new(PixelBuffer::filled(2, 2, [0, 0, 0, 255]));
        source.set_available(false);
        assert_eq!(
            PhotoCapture::capture_from_source(&source),
            Err(FrameError::Disconnected)
        );
    }

    #[test]
    fn test_capture_size_rejects_empty_source() {
        let source = StillImageSource::new(PixelBuffer::new(0, 0));
        assert_eq!(
            PhotoCapture::capture_size(&source),
            Err(FrameError::NoFrameAvailable)
        );
    }
}
