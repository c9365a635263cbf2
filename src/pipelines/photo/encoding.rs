// SPDX-License-Identifier: GPL-3.0-only

//! Async photo encoding pipeline
//!
//! This module handles encoding processed images to various formats:
//! - JPEG (with quality control)
//! - PNG (lossless)
//!
//! Encoded images are persisted as data URIs (`data:image/jpeg;base64,...`)
//! so they survive any string-based key/value store.

use crate::backends::camera::PixelBuffer;
use crate::errors::{PhotoError, StoreError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tracing::{debug, info};

/// Supported encoding formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingFormat {
    /// JPEG format (lossy compression)
    #[default]
    Jpeg,
    /// PNG format (lossless compression)
    Png,
}

impl EncodingFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            EncodingFormat::Jpeg => "jpg",
            EncodingFormat::Png => "png",
        }
    }

    /// MIME type used in data URIs
    pub fn mime_type(&self) -> &'static str {
        match self {
            EncodingFormat::Jpeg => "image/jpeg",
            EncodingFormat::Png => "image/png",
        }
    }
}

/// Encoding quality settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingQuality {
    /// Low quality (high compression)
    Low,
    /// Medium quality (balanced)
    Medium,
    /// High quality (low compression)
    #[default]
    High,
    /// Maximum quality (minimal compression)
    Maximum,
}

impl EncodingQuality {
    /// Get JPEG quality value (0-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            EncodingQuality::Low => 60,
            EncodingQuality::Medium => 80,
            EncodingQuality::High => 92,
            EncodingQuality::Maximum => 98,
        }
    }
}

/// Encoded image data ready for storage
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub format: EncodingFormat,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    /// Self-describing `data:` URI for persistence
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            STANDARD.encode(&self.data)
        )
    }
}

/// Split a `data:<mime>;base64,<payload>` URI into raw bytes
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, StoreError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| StoreError::InvalidSource("missing data: scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| StoreError::InvalidSource("missing payload separator".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(StoreError::InvalidSource(format!(
            "unsupported encoding in '{}'",
            header
        )));
    }
    STANDARD
        .decode(payload)
        .map_err(|e| StoreError::InvalidSource(format!("bad base64 payload: {}", e)))
}

/// Decode a stored data URI back into an RGBA buffer
pub fn decode_to_buffer(uri: &str) -> Result<PixelBuffer, StoreError> {
    let bytes = decode_data_uri(uri)?;
    let image = image::load_from_memory(&bytes)
        .map_err(|e| StoreError::InvalidSource(format!("undecodable image: {}", e)))?;
    Ok(PixelBuffer::from(image.to_rgba8()))
}

/// Photo encoder
#[derive(Debug, Clone)]
pub struct PhotoEncoder {
    format: EncodingFormat,
    quality: EncodingQuality,
}

impl PhotoEncoder {
    /// Create a new encoder with JPEG format and high quality
    pub fn new() -> Self {
        Self {
            format: EncodingFormat::Jpeg,
            quality: EncodingQuality::High,
        }
    }

    /// Set encoding format
    pub fn set_format(&mut self, format: EncodingFormat) {
        self.format = format;
    }

    /// Set encoding quality (only affects JPEG)
    pub fn set_quality(&mut self, quality: EncodingQuality) {
        self.quality = quality;
    }

    pub fn format(&self) -> EncodingFormat {
        self.format
    }

    /// Encode a processed buffer asynchronously
    ///
    /// This runs the encoding in a background task to avoid blocking.
    pub async fn encode(&self, buffer: PixelBuffer) -> Result<EncodedImage, PhotoError> {
        info!(
            width = buffer.width(),
            height = buffer.height(),
            format = ?self.format,
            "Starting encoding"
        );

        let encoder = self.clone();
        tokio::task::spawn_blocking(move || encoder.encode_blocking(buffer))
            .await
            .map_err(|e| PhotoError::Encoding(format!("Encoding task error: {}", e)))?
    }

    /// Encode on the current thread
    pub fn encode_blocking(&self, buffer: PixelBuffer) -> Result<EncodedImage, PhotoError> {
        let (width, height) = buffer.dimensions();
        if width == 0 || height == 0 {
            return Err(PhotoError::Encoding("empty image".to_string()));
        }

        let image = buffer.into_rgba_image();
        let data = match self.format {
            EncodingFormat::Jpeg => Self::encode_jpeg(image, self.quality)?,
            EncodingFormat::Png => Self::encode_png(image)?,
        };

        debug!(size = data.len(), "Encoding complete");

        Ok(EncodedImage {
            data,
            format: self.format,
            width,
            height,
        })
    }

    /// Encode image as JPEG (alpha is dropped)
    fn encode_jpeg(image: image::RgbaImage, quality: EncodingQuality) -> Result<Vec<u8>, PhotoError> {
        let rgb = DynamicImage::ImageRgba8(image).to_rgb8();
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);

        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality.jpeg_quality());

        encoder
            .encode(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| PhotoError::Encoding(format!("JPEG encoding failed: {}", e)))?;

        Ok(buffer)
    }

    /// Encode image as PNG
    fn encode_png(image: image::RgbaImage) -> Result<Vec<u8>, PhotoError> {
        let mut buffer = Vec::new();

        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| PhotoError::Encoding(format!("PNG encoding failed: {}", e)))?;

        Ok(buffer)
    }
}

impl Default for PhotoEncoder {
    fn default() -> Self {
        Self::new()
    }
}
