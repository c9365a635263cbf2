// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for frame capture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              Photo Pipeline                  │
//! └────────────────────┬────────────────────────┘
//!                      │ FrameSource
//! ┌────────────────────┴────────────────────────┐
//! │  ┌──────────────────┐  ┌─────────────────┐  │
//! │  │  Device camera   │  │ Virtual camera  │  │
//! │  │   (external)     │  │  (image file)   │  │
//! │  └──────────────────┘  └─────────────────┘  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`camera`]: The [`camera::FrameSource`] trait and pixel buffer types
//! - [`virtual_camera`]: Frame source backed by a still image

pub mod camera;
pub mod virtual_camera;
