// SPDX-License-Identifier: GPL-3.0-only

//! Filter catalog
//!
//! Maps a filter identifier to a fixed preset of tone/color adjustments.
//! Presets are not composable; each identifier resolves to one ordered list
//! of adjustments, applied left to right with clamping after every step.
//! The color matrices match the CSS filter-effects primitives.

use crate::backends::camera::PixelBuffer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recognized filter identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterId {
    /// No filter applied
    #[default]
    Normal,
    /// Warm sepia with a little extra contrast
    Vintage,
    /// High contrast black & white
    Noir,
    /// Saturated pink shift
    Pawify,
}

impl FilterId {
    /// All filters, in picker order
    pub const ALL: [FilterId; 4] = [
        FilterId::Normal,
        FilterId::Vintage,
        FilterId::Noir,
        FilterId::Pawify,
    ];

    /// Identifier as stored alongside photos
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterId::Normal => "normal",
            FilterId::Vintage => "vintage",
            FilterId::Noir => "noir",
            FilterId::Pawify => "pawify",
        }
    }

    /// Parse an identifier, falling back to [`FilterId::Normal`]
    pub fn parse_lenient(id: &str) -> Self {
        match id.trim().to_ascii_lowercase().as_str() {
            "vintage" => FilterId::Vintage,
            "noir" => FilterId::Noir,
            "pawify" => FilterId::Pawify,
            _ => FilterId::Normal,
        }
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single tone/color adjustment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Adjustment {
    /// Sepia tone, amount in [0, 1]
    Sepia(f32),
    /// Grayscale, amount in [0, 1]
    Grayscale(f32),
    /// Saturation multiplier (1.0 = unchanged)
    Saturate(f32),
    /// Hue rotation in degrees
    HueRotate(f32),
    /// Brightness multiplier (1.0 = unchanged)
    Brightness(f32),
    /// Contrast multiplier around mid-gray (1.0 = unchanged)
    Contrast(f32),
}

/// 3x3 color matrix plus per-channel offset, operating on normalized RGB
#[derive(Debug, Clone, Copy, PartialEq)]
struct ColorTransform {
    m: [[f32; 3]; 3],
    offset: f32,
}

impl ColorTransform {
    fn matrix(m: [[f32; 3]; 3]) -> Self {
        Self { m, offset: 0.0 }
    }

    fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let mut out = [0.0f32; 3];
        for (row, value) in self.m.iter().zip(out.iter_mut()) {
            let v = row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2] + self.offset;
            *value = v.clamp(0.0, 1.0);
        }
        out
    }
}

impl Adjustment {
    fn transform(&self) -> ColorTransform {
        match *self {
            Adjustment::Sepia(amount) => {
                let a = 1.0 - amount.clamp(0.0, 1.0);
                ColorTransform::matrix([
                    [0.393 + 0.607 * a, 0.769 - 0.769 * a, 0.189 - 0.189 * a],
                    [0.349 - 0.349 * a, 0.686 + 0.314 * a, 0.168 - 0.168 * a],
                    [0.272 - 0.272 * a, 0.534 - 0.534 * a, 0.131 + 0.869 * a],
                ])
            }
            Adjustment::Grayscale(amount) => {
                let a = 1.0 - amount.clamp(0.0, 1.0);
                ColorTransform::matrix([
                    [0.2126 + 0.7874 * a, 0.7152 - 0.7152 * a, 0.0722 - 0.0722 * a],
                    [0.2126 - 0.2126 * a, 0.7152 + 0.2848 * a, 0.0722 - 0.0722 * a],
                    [0.2126 - 0.2126 * a, 0.7152 - 0.7152 * a, 0.0722 + 0.9278 * a],
                ])
            }
            Adjustment::Saturate(s) => ColorTransform::matrix([
                [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
                [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
                [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
            ]),
            Adjustment::HueRotate(degrees) => {
                let (sin, cos) = degrees.to_radians().sin_cos();
                ColorTransform::matrix([
                    [
                        0.213 + cos * 0.787 - sin * 0.213,
                        0.715 - cos * 0.715 - sin * 0.715,
                        0.072 - cos * 0.072 + sin * 0.928,
                    ],
                    [
                        0.213 - cos * 0.213 + sin * 0.143,
                        0.715 + cos * 0.285 + sin * 0.140,
                        0.072 - cos * 0.072 - sin * 0.283,
                    ],
                    [
                        0.213 - cos * 0.213 - sin * 0.787,
                        0.715 - cos * 0.715 + sin * 0.715,
                        0.072 + cos * 0.928 + sin * 0.072,
                    ],
                ])
            }
            Adjustment::Brightness(b) => ColorTransform::matrix([
                [b, 0.0, 0.0],
                [0.0, b, 0.0],
                [0.0, 0.0, b],
            ]),
            Adjustment::Contrast(c) => ColorTransform {
                m: [[c, 0.0, 0.0], [0.0, c, 0.0], [0.0, 0.0, c]],
                offset: 0.5 - 0.5 * c,
            },
        }
    }
}

const VINTAGE: &[Adjustment] = &[
    Adjustment::Sepia(0.5),
    Adjustment::Contrast(1.2),
    Adjustment::Brightness(0.9),
];

const NOIR: &[Adjustment] = &[
    Adjustment::Grayscale(1.0),
    Adjustment::Contrast(1.3),
    Adjustment::Brightness(0.8),
];

const PAWIFY: &[Adjustment] = &[
    Adjustment::Saturate(1.3),
    Adjustment::HueRotate(330.0),
    Adjustment::Brightness(1.05),
];

/// A resolved filter preset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterDescriptor {
    id: FilterId,
    adjustments: &'static [Adjustment],
}

impl FilterDescriptor {
    pub fn id(&self) -> FilterId {
        self.id
    }

    /// Adjustments in application order
    pub fn adjustments(&self) -> &'static [Adjustment] {
        self.adjustments
    }

    /// True when applying this filter leaves buffers untouched
    pub fn is_identity(&self) -> bool {
        self.adjustments.is_empty()
    }

    /// Apply the preset to every pixel; alpha is left as is
    pub fn apply(&self, buffer: &mut PixelBuffer) {
        if self.is_identity() {
            return;
        }

        let transforms: Vec<ColorTransform> =
            self.adjustments.iter().map(Adjustment::transform).collect();

        for pixel in buffer.pixels_mut() {
            let mut rgb = [
                f32::from(pixel[0]) / 255.0,
                f32::from(pixel[1]) / 255.0,
                f32::from(pixel[2]) / 255.0,
            ];
            for transform in &transforms {
                rgb = transform.apply(rgb);
            }
            for (channel, value) in pixel.iter_mut().zip(rgb) {
                *channel = (value * 255.0).round() as u8;
            }
        }
    }
}

/// Filter lookup
pub struct FilterCatalog;

impl FilterCatalog {
    /// Resolve a filter identifier; unknown identifiers resolve to `normal`
    pub fn resolve(filter_id: &str) -> FilterDescriptor {
        Self::descriptor(FilterId::parse_lenient(filter_id))
    }

    /// Preset for a known filter
    pub fn descriptor(id: FilterId) -> FilterDescriptor {
        let adjustments = match id {
            FilterId::Normal => &[][..],
            FilterId::Vintage => VINTAGE,
            FilterId::Noir => NOIR,
            FilterId::Pawify => PAWIFY,
        };
        FilterDescriptor { id, adjustments }
    }
}
