// SPDX-License-Identifier: GPL-3.0-only
//! Stack mode photo capture
//!
//! Captures a short burst of frames and averages them into one photo to
//! reduce sensor noise.
//!
//! # Pipeline Overview
//!
//! ```text
//! Burst Capture (5 frames, 200 ms apart)
//!        │
//!        ▼
//! Running Mean (per channel, per pixel; alpha from first frame)
//!        │
//!        ▼
//! Averaged Frame → filter → overlay → encode
//! ```
//!
//! The mean is updated incrementally: for frame index `i >= 1`,
//! `acc = (acc * i + value) / (i + 1)`, which ends at the exact arithmetic
//! mean of all captured frames. Values stay in `f64` until [`StackSession::average`]
//! rounds them once.

pub mod burst;

use crate::backends::camera::PixelBuffer;
use crate::backends::camera::types::CHANNELS;
use crate::constants::timing;
use crate::errors::{FrameError, PhotoError};
use std::time::Duration;

/// Stack mode configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackModeConfig {
    /// Number of frames to average
    pub frame_count: usize,
    /// Delay between consecutive frames
    pub frame_interval: Duration,
}

impl Default for StackModeConfig {
    fn default() -> Self {
        Self {
            frame_count: timing::STACK_FRAME_COUNT,
            frame_interval: timing::STACK_FRAME_INTERVAL,
        }
    }
}

/// Transient state of one stack capture
///
/// Holds a running mean rather than the frames themselves, so memory stays
/// at one accumulation buffer however many frames are stacked.
#[derive(Debug, Clone)]
pub struct StackSession {
    target_frames: usize,
    frame_interval: Duration,
    captured: usize,
    width: u32,
    height: u32,
    mean: Vec<f64>,
}

impl StackSession {
    /// Number of frames this session collects
    pub fn target_frames(&self) -> usize {
        self.target_frames
    }

    /// Delay the capture loop waits between frames
    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Frames accumulated so far
    pub fn captured(&self) -> usize {
        self.captured
    }

    pub fn is_complete(&self) -> bool {
        self.captured >= self.target_frames
    }

    /// Fold the next frame into the running mean
    ///
    /// The first frame fixes the session's dimensions and alpha channel; later
    /// frames must match its size. Frames offered after completion are
    /// rejected.
    pub fn capture_next(&mut self, frame: &PixelBuffer) -> Result<(), PhotoError> {
        if self.is_complete() {
            return Err(PhotoError::Stack(format!(
                "session already holds {} frames",
                self.target_frames
            )));
        }

        if self.captured == 0 {
            self.width = frame.width();
            self.height = frame.height();
            self.mean = frame.data().iter().map(|&v| f64::from(v)).collect();
            self.captured = 1;
            return Ok(());
        }

        if frame.dimensions() != (self.width, self.height) {
            return Err(FrameError::SizeMismatch {
                expected_w: self.width,
                expected_h: self.height,
                actual_w: frame.width(),
                actual_h: frame.height(),
            }
            .into());
        }

        let i = self.captured as f64;
        for (acc, value) in self
            .mean
            .chunks_exact_mut(CHANNELS)
            .zip(frame.data().chunks_exact(CHANNELS))
        {
            // Alpha (index 3) keeps the first frame's value
            for c in 0..3 {
                acc[c] = (acc[c] * i + f64::from(value[c])) / (i + 1.0);
            }
        }
        self.captured += 1;
        Ok(())
    }

    /// Current mean as an RGBA buffer, or `None` before the first frame
    pub fn average(&self) -> Option<PixelBuffer> {
        if self.captured == 0 {
            return None;
        }
        let data = self
            .mean
            .iter()
            .map(|&v| v.round().clamp(0.0, 255.0) as u8)
            .collect();
        PixelBuffer::from_raw(self.width, self.height, data).ok()
    }
}

/// Entry point for stack sessions
pub struct FrameAccumulator;

impl FrameAccumulator {
    /// Start a session collecting `frame_count` frames (at least one)
    pub fn begin_stack(frame_count: usize, frame_interval: Duration) -> StackSession {
        StackSession {
            target_frames: frame_count.max(1),
            frame_interval,
            captured: 0,
            width: 0,
            height: 0,
            mean: Vec::new(),
        }
    }

    /// Start a session from a configuration
    pub fn begin_with(config: &StackModeConfig) -> StackSession {
        Self::begin_stack(config.frame_count, config.frame_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval() -> Duration {
        Duration::from_millis(200)
    }

    #[test]
    fn test_default_config() {
        let config = StackModeConfig::default();
        assert_eq!(config.frame_count, 5);
        assert_eq!(config.frame_interval, Duration::from_millis(200));
    }

    #[test]
    fn test_identical_frames_average_to_frame() {
        let mut frame = PixelBuffer::new(3, 3);
        for (i, pixel) in frame.pixels_mut().enumerate() {
            let v = (i * 29 % 256) as u8;
            pixel.copy_from_slice(&[v, 255 - v, v / 2, 255]);
        }

        let mut session = FrameAccumulator::begin_stack(5, interval());
        for _ in 0..5 {
            session.capture_next(&frame).unwrap();
        }
        assert!(session.is_complete());
        assert_eq!(session.average().unwrap(), frame);
    }

    #[test]
    fn test_single_frame_stack_is_unchanged() {
        let frame = PixelBuffer::filled(4, 2, [13, 77, 201, 90]);
        let mut session = FrameAccumulator::begin_stack(1, interval());
        session.capture_next(&frame).unwrap();
        assert!(session.is_complete());
        assert_eq!(session.average().unwrap(), frame);
    }

    #[test]
    fn test_average_is_exact_mean() {
        let values = [10u8, 20, 30, 40, 55];
        let mut session = FrameAccumulator::begin_stack(values.len(), interval());
        for v in values {
            session
                .capture_next(&PixelBuffer::filled(2, 2, [v, v, 255 - v, 255]))
                .unwrap();
        }
        // mean 31, 255 - 31 = 224
        let average = session.average().unwrap();
        assert_eq!(average.pixel(1, 1), Some([31, 31, 224, 255]));
    }

    #[test]
    fn test_rounds_half_up() {
        let mut session = FrameAccumulator::begin_stack(2, interval());
        session
            .capture_next(&PixelBuffer::filled(1, 1, [0, 0, 0, 255]))
            .unwrap();
        session
            .capture_next(&PixelBuffer::filled(1, 1, [1, 3, 255, 255]))
            .unwrap();
        // 0.5 → 1, 1.5 → 2, 127.5 → 128
        assert_eq!(session.average().unwrap().pixel(0, 0), Some([1, 2, 128, 255]));
    }

    #[test]
    fn test_alpha_keeps_first_frame() {
        let mut session = FrameAccumulator::begin_stack(3, interval());
        session
            .capture_next(&PixelBuffer::filled(2, 2, [100, 100, 100, 40]))
            .unwrap();
        session
            .capture_next(&PixelBuffer::filled(2, 2, [100, 100, 100, 255]))
            .unwrap();
        session
            .capture_next(&PixelBuffer::filled(2, 2, [100, 100, 100, 200]))
            .unwrap();
        assert_eq!(session.average().unwrap().pixel(0, 0), Some([100, 100, 100, 40]));
    }

    #[test]
    fn test_rejects_mismatched_frame() {
        let mut session = FrameAccumulator::begin_stack(3, interval());
        session.capture_next(&PixelBuffer::new(4, 4)).unwrap();
        let err = session.capture_next(&PixelBuffer::new(2, 2)).unwrap_err();
        assert!(matches!(
            err,
            PhotoError::FrameAcquisition(FrameError::SizeMismatch { .. })
        ));
        assert_eq!(session.captured(), 1);
    }

    #[test]
    fn test_rejects_frames_after_completion() {
        let frame = PixelBuffer::new(1, 1);
        let mut session = FrameAccumulator::begin_stack(1, interval());
        session.capture_next(&frame).unwrap();
        assert!(matches!(
            session.capture_next(&frame),
            Err(PhotoError::Stack(_))
        ));
    }

    #[test]
    fn test_empty_session_has_no_average() {
        let session = FrameAccumulator::begin_stack(5, interval());
        assert!(!session.is_complete());
        assert!(session.average().is_none());
    }

    #[test]
    fn test_zero_frame_count_is_clamped() {
        let session = FrameAccumulator::begin_stack(0, interval());
        assert_eq!(session.target_frames(), 1);
    }
}
