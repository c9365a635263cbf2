// SPDX-License-Identifier: GPL-3.0-only

//! Virtual camera backend
//!
//! Serves frames from a still image instead of a device. Used by the CLI to
//! run the photo pipeline against an image file, and by tests as a
//! deterministic frame source.

mod file_source;

pub use file_source::{StillImageSource, load_image_as_frame};
