use crate::{ArtEffectError, Effect, Raster, Result, channel_effect, reflect101};
use derivative::Derivative;
use derive_setters::Setters;
use image::GrayImage;

/// Sigma used for a kernel of `size` taps when none is given.
pub fn auto_sigma(size: u32) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1-D Gaussian taps.
pub fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    let half = (size / 2) as i32;
    let denom = 2.0 * sigma * sigma;
    let mut taps: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();

    let sum: f32 = taps.iter().sum();
    taps.iter_mut().for_each(|t| *t /= sum);
    taps
}

/// Horizontal then vertical pass over an interleaved buffer, reflect-101 borders.
fn separable_blur(src: &[u8], width: u32, height: u32, channels: usize, kernel: &[f32]) -> Vec<u8> {
    let half = (kernel.len() / 2) as i64;
    let (w, h) = (width as usize, height as usize);
    let mut temp = vec![0f32; src.len()];

    for y in 0..h {
        for x in 0..w {
            for c in 0..channels {
                let mut sum = 0.0;
                for (k, weight) in kernel.iter().enumerate() {
                    let sx = reflect101(x as i64 + k as i64 - half, width) as usize;
                    sum += src[(y * w + sx) * channels + c] as f32 * weight;
                }
                temp[(y * w + x) * channels + c] = sum;
            }
        }
    }

    let mut out = vec![0u8; src.len()];
    for y in 0..h {
        for x in 0..w {
            for c in 0..channels {
                let mut sum = 0.0;
                for (k, weight) in kernel.iter().enumerate() {
                    let sy = reflect101(y as i64 + k as i64 - half, height) as usize;
                    sum += temp[(sy * w + x) * channels + c] * weight;
                }
                out[(y * w + x) * channels + c] = sum.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    out
}

/// Gaussian blur with a fixed odd kernel; sigma is derived from the kernel size.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct GaussianBlurConfig {
    #[derivative(Default(value = "21"))]
    kernel_size: u32,
}

impl GaussianBlurConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn kernel(&self) -> Result<Vec<f32>> {
        if self.kernel_size == 0 || self.kernel_size % 2 == 0 {
            return Err(ArtEffectError::Processing(format!(
                "gaussian kernel size must be odd, got {}",
                self.kernel_size
            )));
        }

        Ok(gaussian_kernel(self.kernel_size, auto_sigma(self.kernel_size)))
    }

    pub fn apply_gray(&self, gray: &GrayImage) -> Result<GrayImage> {
        let kernel = self.kernel()?;
        let (width, height) = gray.dimensions();
        let data = separable_blur(gray.as_raw(), width, height, 1, &kernel);

        GrayImage::from_raw(width, height, data)
            .ok_or_else(|| ArtEffectError::Processing("gaussian blur buffer size".to_string()))
    }
}

impl Effect for GaussianBlurConfig {
    fn apply(&self, image: Raster) -> Result<Raster> {
        let kernel = self.kernel()?;
        let (width, height) = image.dimensions();
        let data = separable_blur(image.as_raw(), width, height, 3, &kernel);

        Raster::from_raw(width, height, data)
            .ok_or_else(|| ArtEffectError::Processing("gaussian blur buffer size".to_string()))
    }
}

/// Blur the image and lay the blurred copy back over it.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct GlowConfig {
    #[derivative(Default(value = "10.0"))]
    strength: f32,

    #[derivative(Default(value = "0.3"))]
    alpha: f32,
}

impl GlowConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for GlowConfig {
    fn apply(&self, image: Raster) -> Result<Raster> {
        // imageproc panics on a non-positive sigma, and a zero radius blur is the image itself
        if self.strength <= 0.0 {
            return Ok(image);
        }

        let glow = imageproc::filter::gaussian_blur_f32(&image, self.strength);
        channel_effect::blend(&image, &glow, self.alpha)
    }
}
