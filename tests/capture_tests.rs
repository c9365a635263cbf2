// SPDX-License-Identifier: GPL-3.0-only

//! End-to-end capture tests: frame source → compositor → store

use pawcam::backends::camera::{FrameResult, FrameSource, PixelBuffer};
use pawcam::backends::virtual_camera::StillImageSource;
use pawcam::errors::{FrameError, PhotoError};
use pawcam::pipelines::photo::EncodingFormat;
use pawcam::{
    CaptureMode, CaptureRequest, CaptureState, CompositorSettings, FilterId, PhotoCompositor,
    PhotoStore,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout};

const GRAY: [u8; 4] = [128, 128, 128, 255];

fn settings() -> CompositorSettings {
    CompositorSettings {
        encoding_format: EncodingFormat::Png,
        rng_seed: Some(1),
        ..Default::default()
    }
}

fn gray_source() -> Arc<StillImageSource> {
    Arc::new(StillImageSource::new(PixelBuffer::filled(16, 12, GRAY)))
}

fn compositor_with(
    source: Arc<StillImageSource>,
    store: Arc<PhotoStore>,
) -> PhotoCompositor<Arc<StillImageSource>> {
    PhotoCompositor::new(source, store, settings())
}

/// Serves frames until `fail_at`, then reports the camera gone
struct FlakySource {
    calls: AtomicUsize,
    fail_at: usize,
}

impl FrameSource for FlakySource {
    fn resolution(&self) -> (u32, u32) {
        (4, 4)
    }

    fn capture_frame(&self, width: u32, height: u32) -> FrameResult<PixelBuffer> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.fail_at {
            return Err(FrameError::Disconnected);
        }
        Ok(PixelBuffer::filled(width, height, GRAY))
    }
}

#[tokio::test(start_paused = true)]
async fn test_single_noir_capture() {
    let store = Arc::new(PhotoStore::in_memory());
    let compositor = compositor_with(gray_source(), store.clone());

    let photo = compositor
        .capture(&CaptureRequest::single("noir", false))
        .await
        .unwrap()
        .expect("idle compositor should capture");

    assert_eq!(photo.capture_mode, CaptureMode::Single);
    assert_eq!(photo.filter_id, FilterId::Noir);
    assert!(!photo.overlay_applied);

    let all = store.all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, photo.id);

    let [r, g, b, a] = photo.decode().unwrap().pixel(8, 6).unwrap();
    assert_eq!((r, a), (g, 255));
    assert_eq!(g, b);
    assert!(compositor.state().is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_stack_capture_appends_one_photo() {
    let source = gray_source();
    let store = Arc::new(PhotoStore::in_memory());
    let compositor = compositor_with(source.clone(), store.clone());
    let start = Instant::now();

    let photo = compositor
        .capture(&CaptureRequest::stack("normal", false))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(source.frames_served(), 5);
    assert_eq!(photo.capture_mode, CaptureMode::Stack);
    assert_eq!(store.len(), 1);
    // Four 200 ms gaps plus the 1.5 s preview hold
    assert!(start.elapsed() >= Duration::from_millis(2300));
    assert_eq!(photo.decode().unwrap().pixel(0, 0), Some(GRAY));
}

#[tokio::test(start_paused = true)]
async fn test_stack_progress_is_observable() {
    let compositor = compositor_with(gray_source(), Arc::new(PhotoStore::in_memory()));

    let observer = async {
        sleep(Duration::from_millis(100)).await;
        let early = compositor.state();
        sleep(Duration::from_millis(400)).await;
        (early, compositor.state())
    };
    let request = CaptureRequest::stack("normal", false);
    let (result, (early, later)) = tokio::join!(compositor.capture(&request), observer);

    assert!(result.unwrap().is_some());
    assert_eq!(early, CaptureState::Capturing { captured: 1, total: 5 });
    assert_eq!(later, CaptureState::Capturing { captured: 3, total: 5 });
    assert_eq!(early.to_string(), "Capturing frame 1/5");
}

#[tokio::test(start_paused = true)]
async fn test_capture_while_busy_is_ignored() {
    let source = gray_source();
    let store = Arc::new(PhotoStore::in_memory());
    let compositor = compositor_with(source.clone(), store.clone());

    let stack = CaptureRequest::stack("normal", false);
    let single = CaptureRequest::single("noir", true);
    let (first, second) = tokio::join!(compositor.capture(&stack), compositor.capture(&single));

    assert!(first.unwrap().is_some());
    assert!(second.unwrap().is_none());
    assert_eq!(store.len(), 1);
    assert_eq!(source.frames_served(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_capture_during_preview_is_ignored() {
    let store = Arc::new(PhotoStore::in_memory());
    let compositor = compositor_with(gray_source(), store.clone());

    let first = CaptureRequest::single("normal", false);
    let second = CaptureRequest::single("noir", true);
    let mut states = compositor.subscribe();
    let late = async {
        states
            .wait_for(|s| matches!(s, CaptureState::Previewing { .. }))
            .await
            .unwrap();
        // Halfway through the 1 s hold
        sleep(Duration::from_millis(500)).await;
        let state = compositor.state();
        (state, compositor.capture(&second).await)
    };
    let (taken, (state, ignored)) = tokio::join!(compositor.capture(&first), late);

    let taken = taken.unwrap().unwrap();
    assert_eq!(state, CaptureState::Previewing { id: taken.id });
    assert!(ignored.unwrap().is_none());
    assert_eq!(store.len(), 1);
    assert!(compositor.state().is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_newest_photo_first() {
    let store = Arc::new(PhotoStore::in_memory());
    let compositor = compositor_with(gray_source(), store.clone());

    let mut ids = Vec::new();
    for filter in ["normal", "vintage", "pawify"] {
        let photo = compositor
            .capture(&CaptureRequest::single(filter, false))
            .await
            .unwrap()
            .unwrap();
        ids.push(photo.id);
    }

    let all = store.all();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].id, ids[2]);
    assert_eq!(all[2].id, ids[0]);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(all[0].filter_id, FilterId::Pawify);
}

#[tokio::test(start_paused = true)]
async fn test_failed_acquisition_returns_to_idle() {
    let source = gray_source();
    source.set_available(false);
    let store = Arc::new(PhotoStore::in_memory());
    let compositor = compositor_with(source.clone(), store.clone());

    let err = compositor
        .capture(&CaptureRequest::single("normal", false))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PhotoError::FrameAcquisition(FrameError::Disconnected)
    ));
    assert!(store.is_empty());
    assert!(compositor.state().is_idle());

    // The guard was released, so the next capture goes through
    source.set_available(true);
    assert!(
        compositor
            .capture(&CaptureRequest::single("normal", false))
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test(start_paused = true)]
async fn test_failure_mid_stack_keeps_nothing() {
    let source = FlakySource {
        calls: AtomicUsize::new(0),
        fail_at: 3,
    };
    let store = Arc::new(PhotoStore::in_memory());
    let compositor = PhotoCompositor::new(source, store.clone(), settings());

    let result = compositor
        .capture(&CaptureRequest::stack("normal", true))
        .await;

    assert!(matches!(result, Err(PhotoError::FrameAcquisition(_))));
    assert_eq!(compositor.source().calls.load(Ordering::SeqCst), 4);
    assert!(store.is_empty());
    assert!(compositor.state().is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_persistence_failure_returns_to_idle() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"").unwrap();
    let store = Arc::new(PhotoStore::open(blocker.join("photos.json")).unwrap());
    let compositor = compositor_with(gray_source(), store.clone());

    let err = compositor
        .capture(&CaptureRequest::single("normal", false))
        .await
        .unwrap_err();

    assert!(matches!(err, PhotoError::Persistence(_)));
    assert!(store.is_empty());
    assert!(compositor.state().is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_dropped_capture_releases_guard() {
    let source = gray_source();
    let store = Arc::new(PhotoStore::in_memory());
    let compositor = compositor_with(source.clone(), store.clone());

    let outcome = timeout(
        Duration::from_millis(300),
        compositor.capture(&CaptureRequest::stack("normal", false)),
    )
    .await;

    assert!(outcome.is_err(), "stack should still be capturing");
    assert_eq!(source.frames_served(), 2);
    assert!(compositor.state().is_idle());
    assert!(store.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_persisted_collection_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photos.json");

    let store = Arc::new(PhotoStore::open(&path).unwrap());
    let compositor = compositor_with(gray_source(), store.clone());
    let photo = compositor
        .capture(&CaptureRequest::single("vintage", true))
        .await
        .unwrap()
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(json[0]["id"], photo.id);
    assert_eq!(json[0]["filter"], "vintage");
    assert_eq!(json[0]["pawMode"], true);
    assert_eq!(json[0]["mode"], "single");

    let reopened = PhotoStore::open(&path).unwrap();
    assert_eq!(reopened.all(), store.all());
}
