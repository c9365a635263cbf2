// SPDX-License-Identifier: GPL-3.0-only
//! Burst capture for stack mode
//!
//! Frames are pulled strictly one after another: each capture waits for the
//! previous one to finish plus the frame interval, so frame `i + 1` is always
//! observed after frame `i`. Nothing is captured concurrently.
//!
//! There is no explicit cancel. Dropping the returned future stops the loop
//! and drops the partially filled session with it.

use super::{FrameAccumulator, StackModeConfig, StackSession};
use crate::backends::camera::FrameSource;
use crate::errors::PhotoError;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Largest accepted stack
pub const MAX_FRAME_COUNT: usize = 50;

/// Longest accepted delay between frames
pub const MAX_FRAME_INTERVAL: Duration = Duration::from_millis(1000);

/// Capture a full stack session from the frame source
///
/// # Arguments
/// * `source` - Frame source to pull from
/// * `config` - Frame count and spacing
/// * `size` - Requested frame size (width, height)
/// * `progress_callback` - Called after each frame with (captured, total)
///
/// # Returns
/// The completed session, or the first acquisition error. A failed
/// acquisition abandons the session.
pub async fn capture_stack<S, F>(
    source: &S,
    config: &StackModeConfig,
    size: (u32, u32),
    mut progress_callback: F,
) -> Result<StackSession, PhotoError>
where
    S: FrameSource + ?Sized,
    F: FnMut(usize, usize),
{
    let mut session = FrameAccumulator::begin_with(config);
    let total = session.target_frames();
    let (width, height) = size;

    info!(
        frame_count = total,
        interval_ms = session.frame_interval().as_millis() as u64,
        "Starting stack capture"
    );

    for i in 0..total {
        debug!(frame = i + 1, total, "Capturing frame");

        let frame = source.capture_frame(width, height).map_err(|e| {
            warn!(frame = i + 1, error = %e, "Frame acquisition failed, abandoning stack");
            PhotoError::from(e)
        })?;
        session.capture_next(&frame)?;
        progress_callback(i + 1, total);

        if !session.is_complete() {
            sleep(session.frame_interval()).await;
        }
    }

    info!(captured = session.captured(), "Stack capture complete");
    Ok(session)
}

/// Stack configuration validation
pub fn validate_config(config: &StackModeConfig) -> Result<(), String> {
    if config.frame_count == 0 {
        return Err("Frame count must be at least 1".to_string());
    }
    if config.frame_count > MAX_FRAME_COUNT {
        return Err(format!("Frame count must not exceed {}", MAX_FRAME_COUNT));
    }
    if config.frame_interval > MAX_FRAME_INTERVAL {
        return Err(format!(
            "Frame interval should not exceed {}ms",
            MAX_FRAME_INTERVAL.as_millis()
        ));
    }
    Ok(())
}
