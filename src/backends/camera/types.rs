// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for frame sources

use crate::errors::FrameError;
use image::RgbaImage;

/// Result type for frame source operations
pub type FrameResult<T> = Result<T, FrameError>;

/// Number of channel values per pixel (R, G, B, A)
pub const CHANNELS: usize = 4;

/// Raw RGBA8 image data, row-major
///
/// The length of the data is always `width * height * 4`.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a fully transparent buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0, 0, 0, 0])
    }

    /// Create a buffer with every pixel set to `rgba`
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        let data = rgba.repeat(pixel_count);
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap raw RGBA bytes, validating the length against the dimensions
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> FrameResult<Self> {
        let expected = Self::byte_len(width, height);
        if data.len() != expected {
            return Err(FrameError::InvalidLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Expected byte length for the given dimensions
    pub fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * CHANNELS
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// RGBA value of the pixel at (x, y), or `None` when out of bounds
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px = &self.data[idx..idx + CHANNELS];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Mutable access to the pixel at (x, y)
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Some(&mut self.data[idx..idx + CHANNELS])
    }

    /// Iterate over pixels as mutable 4-byte chunks
    pub fn pixels_mut(&mut self) -> std::slice::ChunksExactMut<'_, u8> {
        self.data.chunks_exact_mut(CHANNELS)
    }

    /// Convert into an `image` crate buffer for encoding
    pub fn into_rgba_image(self) -> RgbaImage {
        let (width, height) = (self.width, self.height);
        // Length is checked at construction, so this cannot fail.
        RgbaImage::from_raw(width, height, self.data)
            .unwrap_or_else(|| RgbaImage::new(width, height))
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}
