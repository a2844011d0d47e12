//! Channel arithmetic
//!
//! Pixelwise division, alpha blending and the single-channel multiply boost.

use crate::{ArtEffectError, Effect, Raster, Result};
use derivative::Derivative;
use derive_setters::Setters;
use image::{GrayImage, Luma};
use std::{fmt, str::FromStr};

/// Which plane the gray image is divided by in the pencil divide-blend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DivideSource {
    /// Blur of the gray image itself.
    #[default]
    Gray,
    /// Blur of the inverted gray image.
    Inverted,
}

impl DivideSource {
    pub const NAMES: &'static [&'static str] = &["self", "inverted"];

    pub fn name(&self) -> &'static str {
        match self {
            DivideSource::Gray => "self",
            DivideSource::Inverted => "inverted",
        }
    }
}

impl FromStr for DivideSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "self" | "gray" => Ok(DivideSource::Gray),
            "inverted" | "invert" => Ok(DivideSource::Inverted),
            other => Err(format!("expected one of {:?}, got `{other}`", Self::NAMES)),
        }
    }
}

impl fmt::Display for DivideSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `min(255, round(numerator * scale / denominator))`, 0 where the denominator is 0.
pub fn divide(numerator: &GrayImage, denominator: &GrayImage, scale: f32) -> Result<GrayImage> {
    if numerator.dimensions() != denominator.dimensions() {
        return Err(ArtEffectError::Processing(format!(
            "divide size mismatch: {:?} vs {:?}",
            numerator.dimensions(),
            denominator.dimensions()
        )));
    }

    let mut out = GrayImage::new(numerator.width(), numerator.height());
    for ((dst, a), b) in out.pixels_mut().zip(numerator.pixels()).zip(denominator.pixels()) {
        let v = if b[0] == 0 {
            0
        } else {
            (a[0] as f32 * scale / b[0] as f32).round().clamp(0.0, 255.0) as u8
        };
        *dst = Luma([v]);
    }

    Ok(out)
}

/// `(1 - alpha) * base + alpha * overlay`
pub fn blend(base: &Raster, overlay: &Raster, alpha: f32) -> Result<Raster> {
    if base.dimensions() != overlay.dimensions() {
        return Err(ArtEffectError::Processing(format!(
            "blend size mismatch: {:?} vs {:?}",
            base.dimensions(),
            overlay.dimensions()
        )));
    }

    let alpha = alpha.clamp(0.0, 1.0);
    let mut out = base.clone();
    for (dst, src) in out.pixels_mut().zip(overlay.pixels()) {
        for i in 0..3 {
            let v = dst[i] as f32 * (1.0 - alpha) + src[i] as f32 * alpha;
            dst[i] = v.round().clamp(0.0, 255.0) as u8;
        }
    }

    Ok(out)
}

/// Multiply the green channel by a brightened copy of itself.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct GreenBoostConfig {
    #[derivative(Default(value = "1.2"))]
    factor: f32,
}

impl GreenBoostConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for GreenBoostConfig {
    fn apply(&self, mut image: Raster) -> Result<Raster> {
        for pixel in image.pixels_mut() {
            let g = pixel[1] as f32;
            let boosted = (g * self.factor).round().clamp(0.0, 255.0);
            pixel[1] = (g * boosted / 255.0).round().clamp(0.0, 255.0) as u8;
        }

        Ok(image)
    }
}
