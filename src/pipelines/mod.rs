// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines for photo capture
//!
//! # Pipeline Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Frame Source │ ──▶ │  Photo Pipeline   │ ──▶ │ Photo Store  │
//! │  (RGBA)      │     │  - Stack average  │     │ (data URIs)  │
//! │              │     │  - Filters        │     │              │
//! │              │     │  - Paw overlay    │     │              │
//! │              │     │  - Encoding       │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`photo`]: Capture orchestration with filters, overlay and encoding

pub mod photo;
