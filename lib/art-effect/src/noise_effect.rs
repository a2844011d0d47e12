//! Randomized effects
//!
//! These are the only primitives whose output depends on a random source. The
//! source is always handed in by the caller so a seeded `StdRng` reproduces a render.

use crate::{Raster, Result};
use derivative::Derivative;
use derive_setters::Setters;
use image::Rgb;
use rand::Rng;

/// Overwrite `width * height / divisor` random pixels with random colors.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct SparseGrainConfig {
    #[derivative(Default(value = "100"))]
    divisor: u32,
}

impl SparseGrainConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grain_count(&self, width: u32, height: u32) -> u64 {
        width as u64 * height as u64 / self.divisor.max(1) as u64
    }

    pub fn apply_with_rng<R: Rng + ?Sized>(&self, mut image: Raster, rng: &mut R) -> Result<Raster> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Ok(image);
        }

        for _ in 0..self.grain_count(width, height) {
            let x = rng.random_range(0..width);
            let y = rng.random_range(0..height);
            image.put_pixel(x, y, Rgb(rng.random::<[u8; 3]>()));
        }

        Ok(image)
    }
}

/// Additive zero-mean Gaussian noise, clamped back into `[0, 255]`.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct GaussianNoiseConfig {
    #[derivative(Default(value = "30.0"))]
    std_dev: f64,
}

impl GaussianNoiseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_with_rng<R: Rng + ?Sized>(&self, mut image: Raster, rng: &mut R) -> Result<Raster> {
        if self.std_dev <= 0.0 {
            return Ok(image);
        }

        let seed = rng.random::<u64>();
        imageproc::noise::gaussian_noise_mut(&mut image, 0.0, self.std_dev, seed);
        Ok(image)
    }
}
