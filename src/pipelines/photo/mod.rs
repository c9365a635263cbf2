// SPDX-License-Identifier: GPL-3.0-only

//! Async photo capture pipeline
//!
//! [`PhotoCompositor`] runs one capture at a time through a fixed sequence:
//!
//! ```text
//! Idle → Capturing → Processing → Previewing → Idle
//!          │             │             │
//!     frame source   filter, paw   photo stored,
//!     (1 or 5 frames) overlay,     preview held
//!                    encode
//! ```
//!
//! A capture request that arrives while the compositor is not idle is
//! ignored, not queued. State changes are published on a watch channel so a
//! UI can drive flash and shutter feedback from them.
//!
//! # Pipeline Stages
//!
//! 1. **Capture**: one frame, or a stack averaged by [`stack_mode`]
//! 2. **Post-Processing**: filter preset, then the optional paw overlay
//! 3. **Encoding**: JPEG/PNG wrapped in a data URI
//! 4. **Storage**: appended to the [`PhotoStore`], newest first

pub mod capture;
pub mod encoding;
pub mod filters;
pub mod overlay;
pub mod processing;
pub mod stack_mode;

pub use capture::PhotoCapture;
pub use encoding::{EncodedImage, EncodingFormat, EncodingQuality, PhotoEncoder};
pub use filters::{FilterCatalog, FilterDescriptor, FilterId};
pub use overlay::{OverlayEffect, PawPrint};
pub use processing::{PostProcessingConfig, PostProcessor};
pub use stack_mode::{FrameAccumulator, StackModeConfig, StackSession};

use crate::backends::camera::{FrameSource, PixelBuffer};
use crate::constants::timing;
use crate::errors::{PhotoError, StoreError};
use crate::storage::{CaptureMode, Photo, PhotoStore};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// How many frames a capture takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShotMode {
    /// One frame
    #[default]
    Single,
    /// Several frames averaged into one
    Stack,
}

impl From<ShotMode> for CaptureMode {
    fn from(mode: ShotMode) -> Self {
        match mode {
            ShotMode::Single => CaptureMode::Single,
            ShotMode::Stack => CaptureMode::Stack,
        }
    }
}

/// Everything one capture needs to know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub mode: ShotMode,
    /// Filter id as selected by the user; unknown ids mean `normal`
    pub filter_id: String,
    /// Stamp paw prints on the photo
    pub overlay: bool,
}

impl CaptureRequest {
    pub fn single(filter_id: impl Into<String>, overlay: bool) -> Self {
        Self {
            mode: ShotMode::Single,
            filter_id: filter_id.into(),
            overlay,
        }
    }

    pub fn stack(filter_id: impl Into<String>, overlay: bool) -> Self {
        Self {
            mode: ShotMode::Stack,
            filter_id: filter_id.into(),
            overlay,
        }
    }
}

/// Observable compositor state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    /// Acquiring frames; `captured` of `total` are in
    Capturing { captured: usize, total: usize },
    /// Filtering, overlaying and encoding
    Processing,
    /// The photo with this id was stored and is on show
    Previewing { id: i64 },
}

impl CaptureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, CaptureState::Idle)
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureState::Idle => write!(f, "Idle"),
            CaptureState::Capturing { captured, total } if *total > 1 => {
                write!(f, "Capturing frame {}/{}", captured, total)
            }
            CaptureState::Capturing { .. } => write!(f, "Capturing"),
            CaptureState::Processing => write!(f, "Processing"),
            CaptureState::Previewing { id } => write!(f, "Previewing photo {}", id),
        }
    }
}

/// Tunables for the compositor
#[derive(Debug, Clone)]
pub struct CompositorSettings {
    pub stack: StackModeConfig,
    pub single_preview_hold: Duration,
    pub stack_preview_hold: Duration,
    pub encoding_format: EncodingFormat,
    pub encoding_quality: EncodingQuality,
    /// Fixed seed for overlay randomness; `None` seeds from the OS
    pub rng_seed: Option<u64>,
}

impl Default for CompositorSettings {
    fn default() -> Self {
        Self {
            stack: StackModeConfig::default(),
            single_preview_hold: timing::SINGLE_PREVIEW_HOLD,
            stack_preview_hold: timing::STACK_PREVIEW_HOLD,
            encoding_format: EncodingFormat::default(),
            encoding_quality: EncodingQuality::default(),
            rng_seed: None,
        }
    }
}

/// Puts the compositor back to idle when dropped
///
/// Held for the whole of a capture, so the busy flag clears on success, on
/// error and when the capture future is dropped mid-flight.
struct BusyGuard<'a> {
    state: &'a watch::Sender<CaptureState>,
}

impl<'a> BusyGuard<'a> {
    /// Move from idle to `next`, or `None` if something is already running
    fn claim(state: &'a watch::Sender<CaptureState>, next: CaptureState) -> Option<Self> {
        let claimed = state.send_if_modified(|current| {
            if current.is_idle() {
                *current = next;
                true
            } else {
                false
            }
        });
        claimed.then_some(Self { state })
    }

    fn set(&self, next: CaptureState) {
        self.state.send_replace(next);
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.state.send_replace(CaptureState::Idle);
    }
}

/// Capture orchestrator
///
/// Owns the frame source and drives it through capture, processing,
/// encoding and storage for one request at a time.
pub struct PhotoCompositor<S> {
    source: S,
    store: Arc<PhotoStore>,
    encoder: PhotoEncoder,
    settings: CompositorSettings,
    rng: Mutex<StdRng>,
    state: watch::Sender<CaptureState>,
}

impl<S: FrameSource> PhotoCompositor<S> {
    pub fn new(source: S, store: Arc<PhotoStore>, settings: CompositorSettings) -> Self {
        let mut encoder = PhotoEncoder::new();
        encoder.set_format(settings.encoding_format);
        encoder.set_quality(settings.encoding_quality);

        let rng = match settings.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (state, _) = watch::channel(CaptureState::Idle);

        Self {
            source,
            store,
            encoder,
            settings,
            rng: Mutex::new(rng),
            state,
        }
    }

    pub fn store(&self) -> &Arc<PhotoStore> {
        &self.store
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn settings(&self) -> &CompositorSettings {
        &self.settings
    }

    /// Current state
    pub fn state(&self) -> CaptureState {
        *self.state.borrow()
    }

    pub fn is_busy(&self) -> bool {
        !self.state().is_idle()
    }

    /// Receiver that sees every state transition
    pub fn subscribe(&self) -> watch::Receiver<CaptureState> {
        self.state.subscribe()
    }

    /// Run one capture
    ///
    /// # Returns
    /// * `Ok(Some(photo))` - The stored photo, after the preview hold
    /// * `Ok(None)` - A capture was already running; the request was ignored
    /// * `Err(PhotoError)` - Acquisition, encoding or storage failed; nothing
    ///   was kept and the compositor is idle again
    pub async fn capture(&self, request: &CaptureRequest) -> Result<Option<Photo>, PhotoError> {
        let total = match request.mode {
            ShotMode::Single => 1,
            ShotMode::Stack => self.settings.stack.frame_count.max(1),
        };
        let Some(guard) =
            BusyGuard::claim(&self.state, CaptureState::Capturing { captured: 0, total })
        else {
            debug!(mode = ?request.mode, state = %self.state(), "Capture in progress, ignoring request");
            return Ok(None);
        };

        let filter = FilterCatalog::resolve(&request.filter_id).id();
        info!(mode = ?request.mode, filter = %filter, overlay = request.overlay, "Capture started");

        let result = self.run_capture(&guard, request, filter).await;
        if let Err(e) = &result {
            error!(mode = ?request.mode, error = %e, "Capture failed");
        }
        result.map(Some)
    }

    async fn run_capture(
        &self,
        guard: &BusyGuard<'_>,
        request: &CaptureRequest,
        filter: FilterId,
    ) -> Result<Photo, PhotoError> {
        let frame = match request.mode {
            ShotMode::Single => {
                let frame = PhotoCapture::capture_from_source(&self.source)?;
                guard.set(CaptureState::Capturing { captured: 1, total: 1 });
                frame
            }
            ShotMode::Stack => {
                let size = PhotoCapture::capture_size(&self.source)?;
                let session =
                    stack_mode::burst::capture_stack(&self.source, &self.settings.stack, size, |captured, total| {
                        guard.set(CaptureState::Capturing { captured, total });
                    })
                    .await?;
                session
                    .average()
                    .ok_or_else(|| PhotoError::Stack("stack finished without frames".to_string()))?
            }
        };

        guard.set(CaptureState::Processing);
        let config = PostProcessingConfig {
            filter,
            overlay: request.overlay,
        };
        let processed = self.process(frame, config).await?;
        let encoded = self.encoder.encode(processed).await?;

        let timestamp = Utc::now();
        let id = self.store.allocate_id(timestamp.timestamp_millis());
        let photo = Photo::new(
            id,
            &encoded,
            timestamp,
            filter,
            request.overlay,
            request.mode.into(),
        );
        self.store.append(photo.clone())?;

        let hold = match request.mode {
            ShotMode::Single => self.settings.single_preview_hold,
            ShotMode::Stack => self.settings.stack_preview_hold,
        };
        guard.set(CaptureState::Previewing { id });
        info!(id, hold_ms = hold.as_millis() as u64, "Photo captured");
        sleep(hold).await;

        Ok(photo)
    }

    /// Re-process a stored photo with another filter and overlay setting
    ///
    /// The photo keeps its id and position and is marked as edited. Ignored
    /// (returns `Ok(None)`) while a capture is running.
    pub async fn edit(
        &self,
        id: i64,
        filter_id: &str,
        overlay: bool,
    ) -> Result<Option<Photo>, PhotoError> {
        let Some(_guard) = BusyGuard::claim(&self.state, CaptureState::Processing) else {
            debug!(id, "Capture in progress, ignoring edit");
            return Ok(None);
        };

        let original = self
            .store
            .get(id)
            .ok_or(StoreError::UnknownPhoto(id))?;
        let frame = original.decode()?;

        let filter = FilterCatalog::resolve(filter_id).id();
        info!(id, filter = %filter, overlay, "Editing photo");

        let processed = self.process(frame, PostProcessingConfig { filter, overlay }).await?;
        let encoded = self.encoder.encode(processed).await?;

        let edited = Photo::new(
            id,
            &encoded,
            original.timestamp,
            filter,
            overlay,
            CaptureMode::Edited,
        );
        self.store.replace(id, edited.clone())?;
        Ok(Some(edited))
    }

    /// Filter and overlay on a blocking thread
    async fn process(
        &self,
        frame: PixelBuffer,
        config: PostProcessingConfig,
    ) -> Result<PixelBuffer, PhotoError> {
        let seed: u64 = self.rng.lock().unwrap_or_else(PoisonError::into_inner).r#gen();
        let processor = PostProcessor::new(config);

        tokio::task::spawn_blocking(move || {
            let mut rng = StdRng::seed_from_u64(seed);
            processor.process(frame, &mut rng)
        })
        .await
        .map_err(processing_failed)
    }
}

/// A filter/overlay task that panicked or was cancelled
fn processing_failed(err: tokio::task::JoinError) -> PhotoError {
    PhotoError::Processing(format!("Processing task error: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_camera::StillImageSource;

    fn gray_compositor() -> PhotoCompositor<StillImageSource> {
        let source = StillImageSource::new(PixelBuffer::filled(8, 8, [128, 128, 128, 255]));
        let settings = CompositorSettings {
            encoding_format: EncodingFormat::Png,
            rng_seed: Some(7),
            ..Default::default()
        };
        PhotoCompositor::new(source, Arc::new(PhotoStore::in_memory()), settings)
    }

    #[test]
    fn test_state_display() {
        assert_eq!(CaptureState::Idle.to_string(), "Idle");
        assert_eq!(
            CaptureState::Capturing { captured: 2, total: 5 }.to_string(),
            "Capturing frame 2/5"
        );
        assert_eq!(
            CaptureState::Capturing { captured: 0, total: 1 }.to_string(),
            "Capturing"
        );
    }

    #[tokio::test]
    async fn test_failed_processing_task_is_not_an_encoding_error() {
        let err = tokio::task::spawn_blocking(|| -> u8 { panic!("filter blew up") })
            .await
            .map_err(processing_failed)
            .unwrap_err();
        assert!(matches!(err, PhotoError::Processing(_)));
        assert!(err.to_string().starts_with("Processing failed:"));
    }

    #[test]
    fn test_guard_claims_only_from_idle() {
        let (state, _) = watch::channel(CaptureState::Idle);
        let guard = BusyGuard::claim(&state, CaptureState::Processing).unwrap();
        assert!(BusyGuard::claim(&state, CaptureState::Processing).is_none());
        drop(guard);
        assert_eq!(*state.borrow(), CaptureState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_capture_holds_preview() {
        let compositor = gray_compositor();
        let start = tokio::time::Instant::now();
        let photo = compositor
            .capture(&CaptureRequest::single("noir", false))
            .await
            .unwrap()
            .unwrap();

        assert!(start.elapsed() >= Duration::from_millis(1000));
        assert_eq!(photo.capture_mode, CaptureMode::Single);
        assert_eq!(photo.filter_id, FilterId::Noir);
        assert!(compositor.state().is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_filter_is_stored_as_normal() {
        let compositor = gray_compositor();
        let photo = compositor
            .capture(&CaptureRequest::single("polaroid", false))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(photo.filter_id, FilterId::Normal);
        assert_eq!(photo.decode().unwrap().pixel(3, 3), Some([128, 128, 128, 255]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_keeps_id_and_position() {
        let compositor = gray_compositor();
        let first = compositor
            .capture(&CaptureRequest::single("normal", false))
            .await
            .unwrap()
            .unwrap();
        compositor
            .capture(&CaptureRequest::single("normal", false))
            .await
            .unwrap();

        let edited = compositor.edit(first.id, "vintage", true).await.unwrap().unwrap();
        assert_eq!(edited.id, first.id);
        assert_eq!(edited.capture_mode, CaptureMode::Edited);
        assert_eq!(edited.filter_id, FilterId::Vintage);
        assert!(edited.overlay_applied);

        let all = compositor.store().all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1], edited);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_unknown_photo() {
        let compositor = gray_compositor();
        let err = compositor.edit(42, "noir", false).await.unwrap_err();
        assert!(matches!(err, PhotoError::Persistence(_)));
        assert!(compositor.state().is_idle());
    }
}
