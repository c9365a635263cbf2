// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the photo pipeline

use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Frame source errors
    #[error("Camera error: {0}")]
    Frame(#[from] FrameError),
    /// Photo capture errors
    #[error("Photo error: {0}")]
    Photo(#[from] PhotoError),
    /// Photo store errors
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

/// Frame source errors
///
/// A frame source never hands out a zeroed buffer in place of a frame; every
/// acquisition failure is one of these.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FrameError {
    /// No frame available for capture
    #[error("No frame available for capture")]
    NoFrameAvailable,
    /// Camera disconnected during operation
    #[error("Camera disconnected")]
    Disconnected,
    /// Raw data does not match the declared dimensions
    #[error("Invalid frame: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    /// Frame size differs from the rest of the stack
    #[error("Frame size mismatch: expected {expected_w}x{expected_h}, got {actual_w}x{actual_h}")]
    SizeMismatch {
        expected_w: u32,
        expected_h: u32,
        actual_w: u32,
        actual_h: u32,
    },
    /// Backend error (file source, device)
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Photo capture errors
#[derive(Debug, Error)]
pub enum PhotoError {
    /// Frame acquisition failed, capture aborted
    #[error("Frame acquisition failed: {0}")]
    FrameAcquisition(#[from] FrameError),
    /// Stack session rejected a frame
    #[error("Stack capture failed: {0}")]
    Stack(String),
    /// Filter or overlay task failed, nothing persisted
    #[error("Processing failed: {0}")]
    Processing(String),
    /// Encoding failed, nothing persisted
    #[error("Encoding failed: {0}")]
    Encoding(String),
    /// Store write failed, photo lost
    #[error("Persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

/// Photo store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// No photo with the given id
    #[error("No photo with id {0}")]
    UnknownPhoto(i64),
    /// Stored image source is not a usable data URI
    #[error("Invalid image source: {0}")]
    InvalidSource(String),
    /// Collection could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// I/O error on the backing file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Store(StoreError::Io(err))
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_error_wraps_into_app_error() {
        let err: AppError = PhotoError::from(FrameError::Disconnected).into();
        assert_eq!(
            err.to_string(),
            "Photo error: Frame acquisition failed: Camera disconnected"
        );
    }

    #[test]
    fn test_size_mismatch_message() {
        let err = FrameError::SizeMismatch {
            expected_w: 4,
            expected_h: 4,
            actual_w: 2,
            actual_h: 2,
        };
        assert_eq!(
            err.to_string(),
            "Frame size mismatch: expected 4x4, got 2x2"
        );
    }
}
