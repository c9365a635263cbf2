// SPDX-License-Identifier: GPL-3.0-only

//! Photo storage
//!
//! [`PhotoStore`] owns the photo collection and is the only writer of its
//! persisted form. The collection is kept newest first and written out as a
//! whole on every mutation: serialized to a temporary file, then renamed over
//! the previous one, so readers of the file never see a partial write.
//!
//! Persisted layout, one record per photo:
//!
//! ```json
//! [{"id": 1717171717171, "src": "data:image/jpeg;base64,...",
//!   "date": "2024-05-31T16:08:37.171Z", "filter": "noir",
//!   "pawMode": false, "mode": "single"}]
//! ```
//!
//! There is no deletion and no size cap; the file grows with every photo.

use crate::constants::storage as consts;
use crate::errors::StoreError;
use crate::pipelines::photo::encoding::{self, EncodedImage};
use crate::pipelines::photo::filters::FilterId;
use crate::backends::camera::PixelBuffer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// How a photo was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// One frame
    #[serde(alias = "photo")]
    Single,
    /// Average of a frame stack
    Stack,
    /// Re-processed from a stored photo
    Edited,
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureMode::Single => write!(f, "single"),
            CaptureMode::Stack => write!(f, "stack"),
            CaptureMode::Edited => write!(f, "edited"),
        }
    }
}

/// A stored photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// Capture time in milliseconds since the Unix epoch, unique per store
    pub id: i64,
    /// Encoded image as a data URI
    #[serde(rename = "src")]
    pub encoded_image: String,
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "filter", deserialize_with = "deserialize_filter")]
    pub filter_id: FilterId,
    #[serde(rename = "pawMode")]
    pub overlay_applied: bool,
    #[serde(rename = "mode")]
    pub capture_mode: CaptureMode,
}

impl Photo {
    pub fn new(
        id: i64,
        image: &EncodedImage,
        timestamp: DateTime<Utc>,
        filter_id: FilterId,
        overlay_applied: bool,
        capture_mode: CaptureMode,
    ) -> Self {
        Self {
            id,
            encoded_image: image.to_data_uri(),
            timestamp,
            filter_id,
            overlay_applied,
            capture_mode,
        }
    }

    /// Raw encoded image bytes
    pub fn image_bytes(&self) -> Result<Vec<u8>, StoreError> {
        encoding::decode_data_uri(&self.encoded_image)
    }

    /// Decoded RGBA pixels
    pub fn decode(&self) -> Result<PixelBuffer, StoreError> {
        encoding::decode_to_buffer(&self.encoded_image)
    }
}

/// Unknown stored filter names read back as `normal`
fn deserialize_filter<'de, D>(deserializer: D) -> Result<FilterId, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(FilterId::parse_lenient(&raw))
}

/// Default location of the persisted collection
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(consts::APP_DIR)
        .join(consts::COLLECTION_FILE)
}

/// Ordered photo collection, newest first
pub struct PhotoStore {
    /// Backing file; `None` keeps the collection in memory only
    path: Option<PathBuf>,
    photos: RwLock<Vec<Photo>>,
}

impl PhotoStore {
    /// Store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self {
            path: None,
            photos: RwLock::new(Vec::new()),
        }
    }

    /// Open (or start) the collection persisted at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let photos = if path.exists() {
            let bytes = std::fs::read(&path)?;
            let photos: Vec<Photo> = serde_json::from_slice(&bytes)?;
            info!(path = %path.display(), count = photos.len(), "Loaded photo collection");
            photos
        } else {
            debug!(path = %path.display(), "No photo collection yet");
            Vec::new()
        };

        Ok(Self {
            path: Some(path),
            photos: RwLock::new(photos),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Insert a photo at the front and persist the collection
    ///
    /// When the write fails the in-memory collection is left unchanged and
    /// the photo is lost.
    pub fn append(&self, photo: Photo) -> Result<(), StoreError> {
        let mut photos = self.write();
        let mut updated = Vec::with_capacity(photos.len() + 1);
        updated.push(photo);
        updated.extend(photos.iter().cloned());

        self.persist(&updated)?;
        if let Some(first) = updated.first() {
            info!(id = first.id, mode = %first.capture_mode, count = updated.len(), "Photo stored");
        }
        *photos = updated;
        Ok(())
    }

    /// Swap the photo with `id` for `photo`, keeping its position
    pub fn replace(&self, id: i64, photo: Photo) -> Result<(), StoreError> {
        let mut photos = self.write();
        let index = photos
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::UnknownPhoto(id))?;

        let mut updated = photos.clone();
        updated[index] = photo;

        self.persist(&updated)?;
        info!(id, "Photo replaced");
        *photos = updated;
        Ok(())
    }

    /// Snapshot of the collection, newest first
    pub fn all(&self) -> Vec<Photo> {
        self.read().clone()
    }

    pub fn get(&self, id: i64) -> Option<Photo> {
        self.read().iter().find(|p| p.id == id).cloned()
    }

    /// Most recent photo, for the gallery button
    pub fn latest(&self) -> Option<Photo> {
        self.read().first().cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Id for a photo captured at `timestamp_ms`
    ///
    /// Ids follow capture time but never repeat or go backwards: a timestamp
    /// at or before the newest id is bumped past it.
    pub fn allocate_id(&self, timestamp_ms: i64) -> i64 {
        match self.read().first() {
            Some(newest) if timestamp_ms <= newest.id => newest.id + 1,
            _ => timestamp_ms,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Photo>> {
        self.photos.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Photo>> {
        self.photos.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write the whole collection: temp file, then rename over the old one
    fn persist(&self, photos: &[Photo]) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_vec(photos)?;
        let tmp_path = path.with_extension("json.tmp");
        if let Err(e) = std::fs::write(&tmp_path, &json).and_then(|_| std::fs::rename(&tmp_path, path)) {
            warn!(path = %path.display(), error = %e, "Failed to persist photo collection");
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        debug!(path = %path.display(), bytes = json.len(), "Photo collection persisted");
        Ok(())
    }
}
