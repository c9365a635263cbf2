// SPDX-License-Identifier: GPL-3.0-only

//! Post-processing for captured frames
//!
//! Applies the selected filter preset, then the paw overlay when enabled.
//! The overlay always runs after the filter so the prints keep their pink
//! regardless of the tone preset.

use super::filters::{FilterCatalog, FilterId};
use super::overlay::OverlayEffect;
use crate::backends::camera::PixelBuffer;
use rand::Rng;
use tracing::debug;

/// Post-processing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PostProcessingConfig {
    /// Filter preset to apply
    pub filter: FilterId,
    /// Stamp the paw overlay after filtering
    pub overlay: bool,
}

/// Post-processor for captured frames
#[derive(Debug, Clone, Default)]
pub struct PostProcessor {
    config: PostProcessingConfig,
    overlay: OverlayEffect,
}

impl PostProcessor {
    /// Create a new post-processor with the given configuration
    pub fn new(config: PostProcessingConfig) -> Self {
        Self {
            config,
            overlay: OverlayEffect::new(),
        }
    }

    pub fn config(&self) -> PostProcessingConfig {
        self.config
    }

    /// Filter then (optionally) overlay the buffer
    pub fn process<R: Rng + ?Sized>(&self, mut buffer: PixelBuffer, rng: &mut R) -> PixelBuffer {
        debug!(
            width = buffer.width(),
            height = buffer.height(),
            filter = %self.config.filter,
            overlay = self.config.overlay,
            "Starting post-processing"
        );

        FilterCatalog::descriptor(self.config.filter).apply(&mut buffer);

        if self.config.overlay {
            self.overlay.apply(&mut buffer, rng);
        }

        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_default_config() {
        let config = PostProcessingConfig::default();
        assert_eq!(config.filter, FilterId::Normal);
        assert!(!config.overlay);
    }

    #[test]
    fn test_plain_processing_is_identity() {
        let original = PixelBuffer::filled(6, 6, [10, 200, 30, 255]);
        let processed =
            PostProcessor::default().process(original.clone(), &mut StdRng::seed_from_u64(0));
        assert_eq!(processed, original);
    }

    #[test]
    fn test_overlay_runs_after_filter() {
        let original = PixelBuffer::filled(32, 32, [128, 128, 128, 255]);
        let mut rng = StdRng::seed_from_u64(5);
        let processor = PostProcessor::new(PostProcessingConfig {
            filter: FilterId::Noir,
            overlay: true,
        });
        let processed = processor.process(original.clone(), &mut rng);

        // Noir alone leaves every pixel gray; the overlay's pink tint breaks that
        let tinted = processed
            .data()
            .chunks_exact(4)
            .any(|p| p[0] != p[1] || p[1] != p[2]);
        assert!(tinted);
    }
}
