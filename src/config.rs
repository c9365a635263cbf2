// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{storage, timing};
use crate::errors::{AppError, AppResult};
use crate::pipelines::photo::filters::FilterId;
use crate::pipelines::photo::stack_mode::burst::validate_config;
use crate::pipelines::photo::{
    CompositorSettings, EncodingFormat, EncodingQuality, StackModeConfig,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Stack mode settings as stored on disk
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackSettings {
    /// Frames averaged per stack photo
    pub frame_count: usize,
    /// Delay between frames in milliseconds
    pub frame_interval_ms: u64,
}

impl Default for StackSettings {
    fn default() -> Self {
        Self {
            frame_count: timing::STACK_FRAME_COUNT,
            frame_interval_ms: timing::STACK_FRAME_INTERVAL.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Photo collection file; `None` uses the data directory
    pub store_path: Option<PathBuf>,
    /// Output encoding (JPEG or PNG)
    pub encoding_format: EncodingFormat,
    /// JPEG quality preset
    pub encoding_quality: EncodingQuality,
    /// Filter used when none is given
    pub default_filter: FilterId,
    /// Stamp paw prints by default
    pub paw_overlay: bool,
    pub stack: StackSettings,
    /// Preview hold after a single shot, in milliseconds
    pub single_preview_hold_ms: u64,
    /// Preview hold after a stack shot, in milliseconds
    pub stack_preview_hold_ms: u64,
    /// Fixed overlay seed, for reproducible output
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: None,
            encoding_format: EncodingFormat::default(),
            encoding_quality: EncodingQuality::default(),
            default_filter: FilterId::Normal,
            paw_overlay: false,
            stack: StackSettings::default(),
            single_preview_hold_ms: timing::SINGLE_PREVIEW_HOLD.as_millis() as u64,
            stack_preview_hold_ms: timing::STACK_PREVIEW_HOLD.as_millis() as u64,
            rng_seed: None,
        }
    }
}

impl Config {
    /// Default config file location (`<config dir>/pawcam/config.json`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(storage::APP_DIR).join(storage::CONFIG_FILE))
    }

    /// Load from `path`, falling back to defaults when the file is missing
    ///
    /// A file that exists but cannot be parsed, or holds out-of-range stack
    /// settings, is an error.
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Invalid config '{}': {}", path.display(), e))
        })?;
        config.validate().map_err(|e| {
            AppError::Config(format!("Invalid config '{}': {}", path.display(), e))
        })?;

        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Load from the default location
    pub fn load_default() -> AppResult<Self> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Write the config as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Check stack settings against the capture limits
    pub fn validate(&self) -> Result<(), String> {
        validate_config(&self.stack_config())
    }

    /// Where the photo collection lives
    pub fn store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(crate::storage::default_store_path)
    }

    pub fn stack_config(&self) -> StackModeConfig {
        StackModeConfig {
            frame_count: self.stack.frame_count,
            frame_interval: std::time::Duration::from_millis(self.stack.frame_interval_ms),
        }
    }

    /// Compositor settings derived from this config
    pub fn compositor_settings(&self) -> CompositorSettings {
        CompositorSettings {
            stack: self.stack_config(),
            single_preview_hold: std::time::Duration::from_millis(self.single_preview_hold_ms),
            stack_preview_hold: std::time::Duration::from_millis(self.stack_preview_hold_ms),
            encoding_format: self.encoding_format,
            encoding_quality: self.encoding_quality,
            rng_seed: self.rng_seed,
        }
    }
}
