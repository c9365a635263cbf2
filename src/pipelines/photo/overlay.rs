// SPDX-License-Identifier: GPL-3.0-only

//! Paw overlay effect
//!
//! Stamps a random handful of translucent paw prints onto a photo, then tints
//! the edges with a pink radial gradient composited in overlay blend mode.
//!
//! ```text
//!        (-15,-15) ●   ● (15,-15)
//!   (-25,0) ●             ● (25,0)
//!                 ⬮  pad at (0,10), 15x20
//! ```
//!
//! Each print is placed with translate → rotate → scale, built fresh from the
//! identity transform so one print's placement never carries into the next.
//! The effect is random by nature; callers pass the random source in so tests
//! can seed it.

use crate::backends::camera::PixelBuffer;
use crate::constants::overlay as paw;
use kurbo::{Affine, Ellipse, Point, Rect, Shape};
use rand::Rng;
use std::f64::consts::TAU;
use tracing::debug;

/// Compositing operator for fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Normal alpha compositing
    #[default]
    SourceOver,
    /// Multiply dark backdrop areas, screen light ones
    Overlay,
}

/// Placement of one paw print
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PawPrint {
    /// Origin in buffer coordinates
    pub position: Point,
    /// Uniform scale in [0.2, 0.5)
    pub scale: f64,
    /// Rotation in radians, [0, 2π)
    pub rotation: f64,
}

impl PawPrint {
    /// Random placement inside a `width` x `height` buffer
    pub fn random<R: Rng + ?Sized>(rng: &mut R, width: u32, height: u32) -> Self {
        Self {
            position: Point::new(
                rng.gen_range(0.0..f64::from(width)),
                rng.gen_range(0.0..f64::from(height)),
            ),
            scale: rng.gen_range(paw::MIN_SCALE..paw::MAX_SCALE),
            rotation: rng.gen_range(0.0..TAU),
        }
    }

    /// Local paw coordinates to buffer coordinates
    pub fn transform(&self) -> Affine {
        Affine::translate(self.position.to_vec2())
            * Affine::rotate(self.rotation)
            * Affine::scale(self.scale)
    }

    /// Pad followed by the four toes, already placed in buffer space
    pub fn ellipses(&self) -> (Ellipse, [Ellipse; 4]) {
        let xf = self.transform();
        let pad = xf * Ellipse::new(paw::PAD_CENTER, paw::PAD_RADII, 0.0);
        let toes = paw::TOE_CENTERS
            .map(|center| xf * Ellipse::new(center, (paw::TOE_RADIUS, paw::TOE_RADIUS), 0.0));
        (pad, toes)
    }
}

/// Minimal fill surface over a pixel buffer
///
/// Holds the current blend mode the way a 2D canvas context does; fills use
/// whatever mode is current.
struct Painter<'a> {
    buffer: &'a mut PixelBuffer,
    blend: BlendMode,
}

impl<'a> Painter<'a> {
    fn new(buffer: &'a mut PixelBuffer) -> Self {
        Self {
            buffer,
            blend: BlendMode::SourceOver,
        }
    }

    fn set_blend(&mut self, blend: BlendMode) {
        self.blend = blend;
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            f64::from(self.buffer.width()),
            f64::from(self.buffer.height()),
        )
    }

    /// Fill an ellipse with a flat color, sampling at pixel centres
    fn fill_ellipse(&mut self, ellipse: &Ellipse, color: [u8; 3], alpha: f32) {
        let area = ellipse.bounding_box().intersect(self.bounds());
        if area.width() <= 0.0 || area.height() <= 0.0 {
            return;
        }

        let x0 = area.x0.floor() as u32;
        let y0 = area.y0.floor() as u32;
        let x1 = (area.x1.ceil() as u32).min(self.buffer.width());
        let y1 = (area.y1.ceil() as u32).min(self.buffer.height());
        let blend = self.blend;

        for y in y0..y1 {
            for x in x0..x1 {
                let centre = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                if !ellipse.contains(centre) {
                    continue;
                }
                if let Some(pixel) = self.buffer.pixel_mut(x, y) {
                    composite(pixel, color, alpha, blend);
                }
            }
        }
    }

    /// Fill the whole buffer with a radial gradient around `centre`
    ///
    /// Clear up to `clear_stop * radius`, ramping linearly to `alpha` at the
    /// radius and padded with the edge color beyond it.
    fn fill_radial_gradient(
        &mut self,
        centre: Point,
        radius: f64,
        clear_stop: f64,
        color: [u8; 3],
        alpha: f32,
    ) {
        if radius <= 0.0 {
            return;
        }
        let (width, height) = self.buffer.dimensions();
        let blend = self.blend;

        for y in 0..height {
            for x in 0..width {
                let p = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let t = p.distance(centre) / radius;
                let coverage = gradient_ramp(t, clear_stop);
                if coverage <= 0.0 {
                    continue;
                }
                if let Some(pixel) = self.buffer.pixel_mut(x, y) {
                    composite(pixel, color, alpha * coverage as f32, blend);
                }
            }
        }
    }
}

/// Position along the gradient to opacity factor in [0, 1]
fn gradient_ramp(t: f64, clear_stop: f64) -> f64 {
    if t <= clear_stop {
        0.0
    } else if t >= 1.0 {
        1.0
    } else {
        (t - clear_stop) / (1.0 - clear_stop)
    }
}

/// Composite a flat source color onto one straight-alpha RGBA pixel
fn composite(dst: &mut [u8], src: [u8; 3], src_alpha: f32, blend: BlendMode) {
    let sa = src_alpha.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = f32::from(dst[3]) / 255.0;
    let out_alpha = sa + da * (1.0 - sa);
    if out_alpha <= 0.0 {
        return;
    }

    for i in 0..3 {
        let cs = f32::from(src[i]) / 255.0;
        let cb = f32::from(dst[i]) / 255.0;
        let mixed = match blend {
            BlendMode::SourceOver => cs,
            BlendMode::Overlay => overlay_channel(cb, cs),
        };
        // Premultiplied sum of source-only, overlap and backdrop-only regions
        let premul = sa * (1.0 - da) * cs + sa * da * mixed + (1.0 - sa) * da * cb;
        dst[i] = ((premul / out_alpha).clamp(0.0, 1.0) * 255.0).round() as u8;
    }
    dst[3] = (out_alpha * 255.0).round() as u8;
}

/// Overlay blend of backdrop `cb` and source `cs`
fn overlay_channel(cb: f32, cs: f32) -> f32 {
    if cb <= 0.5 {
        2.0 * cs * cb
    } else {
        1.0 - 2.0 * (1.0 - cs) * (1.0 - cb)
    }
}

/// The paw overlay effect
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayEffect;

impl OverlayEffect {
    pub fn new() -> Self {
        Self
    }

    /// Pick how many prints to draw and where
    pub fn plan<R: Rng + ?Sized>(&self, rng: &mut R, width: u32, height: u32) -> Vec<PawPrint> {
        if width == 0 || height == 0 {
            return Vec::new();
        }
        let count = rng.gen_range(paw::MIN_SHAPES..=paw::MAX_SHAPES);
        (0..count)
            .map(|_| PawPrint::random(rng, width, height))
            .collect()
    }

    /// Stamp paw prints and the edge tint onto `buffer`
    ///
    /// Dimensions are preserved. Applying the effect again stacks more prints
    /// and deepens the tint.
    pub fn apply<R: Rng + ?Sized>(&self, buffer: &mut PixelBuffer, rng: &mut R) {
        let (width, height) = buffer.dimensions();
        let prints = self.plan(rng, width, height);
        if prints.is_empty() {
            return;
        }
        debug!(prints = prints.len(), width, height, "Applying paw overlay");

        let mut painter = Painter::new(buffer);
        for print in &prints {
            let (pad, toes) = print.ellipses();
            painter.fill_ellipse(&pad, paw::PAD_COLOR, paw::PAD_ALPHA);
            for toe in &toes {
                painter.fill_ellipse(toe, paw::TOE_COLOR, paw::TOE_ALPHA);
            }
        }

        let centre = Point::new(f64::from(width) / 2.0, f64::from(height) / 2.0);
        let radius = f64::from(width.max(height)) / paw::GRADIENT_RADIUS_DIVISOR;
        painter.set_blend(BlendMode::Overlay);
        painter.fill_radial_gradient(
            centre,
            radius,
            paw::GRADIENT_CLEAR_STOP,
            paw::GRADIENT_COLOR,
            paw::GRADIENT_ALPHA,
        );
        painter.set_blend(BlendMode::SourceOver);
    }
}
