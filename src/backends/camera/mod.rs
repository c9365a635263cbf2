// SPDX-License-Identifier: GPL-3.0-only

//! Frame source abstraction
//!
//! The photo pipeline never talks to a camera device directly. It asks a
//! [`FrameSource`] for the current frame at a given size; device acquisition
//! and constraint negotiation live behind this trait.

pub mod types;

pub use types::{FrameResult, PixelBuffer};

/// A live frame provider
pub trait FrameSource: Send + Sync {
    /// Native resolution of the frames this source produces
    fn resolution(&self) -> (u32, u32);

    /// Grab the current frame as an RGBA buffer of `width` x `height`
    ///
    /// # Returns
    /// * `Ok(PixelBuffer)` - The current frame
    /// * `Err(FrameError)` - Source unavailable; never a zeroed buffer
    fn capture_frame(&self, width: u32, height: u32) -> FrameResult<PixelBuffer>;
}

impl<T: FrameSource + ?Sized> FrameSource for std::sync::Arc<T> {
    fn resolution(&self) -> (u32, u32) {
        (**self).resolution()
    }

    fn capture_frame(&self, width: u32, height: u32) -> FrameResult<PixelBuffer> {
        (**self).capture_frame(width, height)
    }
}
