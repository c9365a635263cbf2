// SPDX-License-Identifier: GPL-3.0-only

//! Pawcam - a playful photo booth pipeline
//!
//! Takes frames from a camera-like source, optionally averages a short burst
//! of them, runs a filter preset and a paw print overlay, and keeps the
//! results in a persisted photo collection.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: Frame source abstraction and a still image source
//! - [`pipelines`]: Capture orchestration, stack mode, filters, overlay, encoding
//! - [`storage`]: The photo collection and its on-disk form
//! - [`config`]: User configuration handling
//! - [`constants`]: Timing, overlay geometry and storage names
//! - [`errors`]: Error types shared by all layers
//!
//! # Example
//!
//! ```no_run
//! use pawcam::{CaptureRequest, CompositorSettings, PhotoCompositor, PhotoStore};
//! use pawcam::backends::camera::PixelBuffer;
//! use pawcam::backends::virtual_camera::StillImageSource;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), pawcam::errors::PhotoError> {
//! let source = StillImageSource::new(PixelBuffer::filled(640, 480, [128, 128, 128, 255]));
//! let store = Arc::new(PhotoStore::in_memory());
//! let compositor = PhotoCompositor::new(source, store, CompositorSettings::default());
//! let photo = compositor.capture(&CaptureRequest::single("noir", true)).await?;
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod pipelines;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use pipelines::photo::{
    CaptureRequest, CaptureState, CompositorSettings, FilterCatalog, FilterId, OverlayEffect,
    PhotoCompositor, ShotMode,
};
pub use storage::{CaptureMode, Photo, PhotoStore};
