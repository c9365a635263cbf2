// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Capture timing constants
pub mod timing {
    use super::Duration;

    /// Number of frames averaged in stack mode
    pub const STACK_FRAME_COUNT: usize = 5;

    /// Delay between consecutive stack frames
    pub const STACK_FRAME_INTERVAL: Duration = Duration::from_millis(200);

    /// How long a single-shot photo stays in preview before returning to idle
    pub const SINGLE_PREVIEW_HOLD: Duration = Duration::from_millis(1000);

    /// How long a stacked photo stays in preview before returning to idle
    pub const STACK_PREVIEW_HOLD: Duration = Duration::from_millis(1500);
}

/// Paw overlay geometry and colors
pub mod overlay {
    /// Inclusive range of paw prints drawn per application
    pub const MIN_SHAPES: u32 = 2;
    pub const MAX_SHAPES: u32 = 4;

    /// Half-open range of per-shape scale factors
    pub const MIN_SCALE: f64 = 0.2;
    pub const MAX_SCALE: f64 = 0.5;

    /// Main pad: centre offset along local y and semi-axes
    pub const PAD_CENTER: (f64, f64) = (0.0, 10.0);
    pub const PAD_RADII: (f64, f64) = (15.0, 20.0);

    /// Toe beans, drawn after the pad
    pub const TOE_CENTERS: [(f64, f64); 4] = [(-15.0, -15.0), (15.0, -15.0), (-25.0, 0.0), (25.0, 0.0)];
    pub const TOE_RADIUS: f64 = 10.0;

    /// Pad fill (hot pink, 40% opacity)
    pub const PAD_COLOR: [u8; 3] = [255, 105, 180];
    pub const PAD_ALPHA: f32 = 0.4;

    /// Toe fill (light pink, 60% opacity)
    pub const TOE_COLOR: [u8; 3] = [255, 182, 193];
    pub const TOE_ALPHA: f32 = 0.6;

    /// Vignette tint: radius is `max(width, height) / RADIUS_DIVISOR`
    pub const GRADIENT_RADIUS_DIVISOR: f64 = 1.5;
    /// Fraction of the radius that stays fully transparent
    pub const GRADIENT_CLEAR_STOP: f64 = 0.8;
    pub const GRADIENT_COLOR: [u8; 3] = [255, 105, 180];
    pub const GRADIENT_ALPHA: f32 = 0.3;
}

/// Photo store constants
pub mod storage {
    /// File name of the persisted photo collection
    pub const COLLECTION_FILE: &str = "photos.json";

    /// Directory name under the user data/config directories
    pub const APP_DIR: &str = "pawcam";

    /// Configuration file name
    pub const CONFIG_FILE: &str = "config.json";
}

/// Supported file formats for the still image frame source
pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extensions() {
        assert!(file_formats::is_image_extension("PNG"));
        assert!(file_formats::is_image_extension("jpeg"));
        assert!(!file_formats::is_image_extension("mp4"));
    }

    #[test]
    fn test_stack_preview_outlasts_single() {
        assert!(timing::STACK_PREVIEW_HOLD > timing::SINGLE_PREVIEW_HOLD);
    }
}
