// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for photo operations
//!
//! This module provides command-line functionality for:
//! - Taking single and stack photos from an image file source
//! - Editing, listing and exporting stored photos
//! - Listing filters

use pawcam::backends::virtual_camera::StillImageSource;
use pawcam::pipelines::photo::encoding;
use pawcam::pipelines::photo::filters::{FilterCatalog, FilterId};
use pawcam::{CaptureRequest, Config, PhotoCompositor, PhotoStore, ShotMode};
use std::path::Path;
use std::sync::Arc;

/// Take a photo with an image file standing in for the camera
pub fn take_photo(
    config: &Config,
    source: &Path,
    filter: Option<String>,
    paw: bool,
    stack: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = StillImageSource::open(source)?;
    let store = Arc::new(PhotoStore::open(config.store_path())?);
    let compositor = PhotoCompositor::new(source, store, config.compositor_settings());

    let request = CaptureRequest {
        mode: if stack { ShotMode::Stack } else { ShotMode::Single },
        filter_id: filter.unwrap_or_else(|| config.default_filter.as_str().to_string()),
        overlay: paw || config.paw_overlay,
    };

    println!("Capturing...");

    // Create async runtime for the pipeline
    let rt = tokio::runtime::Runtime::new()?;
    let photo = rt.block_on(async {
        let mut states = compositor.subscribe();
        let capture = compositor.capture(&request);
        tokio::pin!(capture);

        loop {
            tokio::select! {
                result = &mut capture => break result,
                Ok(()) = states.changed() => {
                    let state = *states.borrow_and_update();
                    if !state.is_idle() {
                        println!("  {}", state);
                    }
                }
            }
        }
    })?;

    match photo {
        Some(photo) => {
            println!(
                "Photo stored: id {} ({} mode, filter {}{})",
                photo.id,
                photo.capture_mode,
                photo.filter_id,
                if photo.overlay_applied { ", paws" } else { "" }
            );
            println!("Collection: {}", config.store_path().display());
        }
        None => println!("Capture already in progress"),
    }
    Ok(())
}

/// Re-process a stored photo
pub fn edit_photo(
    config: &Config,
    id: i64,
    filter: Option<String>,
    paw: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(PhotoStore::open(config.store_path())?);
    let original = store
        .get(id)
        .ok_or_else(|| format!("No photo with id {}", id))?;

    // The stored image is the frame; the source itself is never read
    let source = StillImageSource::new(original.decode()?);
    let compositor = PhotoCompositor::new(source, store, config.compositor_settings());

    let filter = edit_filter(filter);
    let rt = tokio::runtime::Runtime::new()?;
    if let Some(photo) = rt.block_on(compositor.edit(id, &filter, paw))? {
        println!("Photo {} edited: filter {}", photo.id, photo.filter_id);
    }
    Ok(())
}

/// Filter for an edit
///
/// The stored pixels already carry their filter, so without `--filter` the
/// edit adds none and only the paw setting changes.
fn edit_filter(filter: Option<String>) -> String {
    filter.unwrap_or_else(|| FilterId::Normal.as_str().to_string())
}

/// Print the stored photos, newest first
pub fn list_gallery(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = PhotoStore::open(config.store_path())?;
    let photos = store.all();

    if photos.is_empty() {
        println!("No photos yet.");
        return Ok(());
    }

    println!("Photos ({}):", photos.len());
    println!();
    for photo in &photos {
        println!(
            "  [{}] {}  {:<6}  {:<8}{}",
            photo.id,
            photo.timestamp.format("%Y-%m-%d %H:%M:%S"),
            photo.capture_mode.to_string(),
            photo.filter_id.as_str(),
            if photo.overlay_applied { "  paws" } else { "" }
        );
    }

    Ok(())
}

/// Write a stored photo's encoded image to `output`
pub fn export_photo(
    config: &Config,
    id: i64,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = PhotoStore::open(config.store_path())?;
    let photo = store
        .get(id)
        .ok_or_else(|| format!("No photo with id {}", id))?;

    let bytes = encoding::decode_data_uri(&photo.encoded_image)?;
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output, bytes)?;

    println!("Photo saved: {}", output.display());
    Ok(())
}

/// Print the filter ids
pub fn list_filters() -> Result<(), Box<dyn std::error::Error>> {
    println!("Available filters:");
    for id in FilterId::ALL {
        let descriptor = FilterCatalog::descriptor(id);
        let steps = descriptor.adjustments().len();
        if descriptor.is_identity() {
            println!("  {}", id);
        } else {
            println!("  {} ({} adjustments)", id, steps);
        }
    }
    Ok(())
}
