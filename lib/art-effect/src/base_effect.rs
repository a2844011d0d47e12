use crate::{Effect, Raster, Result};
use derivative::Derivative;
use derive_setters::Setters;
use image::{GrayImage, Luma, Rgb};

#[inline]
pub fn luminance(pixel: &Rgb<u8>) -> u8 {
    // Human perception: 0.299*R + 0.587*G + 0.114*B
    (0.299 * pixel[0] as f32 + 0.587 * pixel[1] as f32 + 0.114 * pixel[2] as f32)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Reduce a 3-channel raster to its luminance plane.
pub fn to_gray(image: &Raster) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([luminance(image.get_pixel(x, y))])
    })
}

/// Promote a single-channel plane back to 3 equal channels.
pub fn gray_to_rgb(gray: &GrayImage) -> Raster {
    Raster::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y)[0];
        Rgb([v, v, v])
    })
}

/// Invert the colors of an image
pub fn invert(mut image: Raster) -> Raster {
    for pixel in image.pixels_mut() {
        pixel[0] = 255 - pixel[0];
        pixel[1] = 255 - pixel[1];
        pixel[2] = 255 - pixel[2];
    }

    image
}

pub fn invert_gray(mut gray: GrayImage) -> GrayImage {
    for pixel in gray.pixels_mut() {
        pixel[0] = 255 - pixel[0];
    }

    gray
}

/// Rounded mean luminance of the whole image.
pub fn mean_luminance(image: &Raster) -> u8 {
    let count = image.width() as u64 * image.height() as u64;
    if count == 0 {
        return 0;
    }

    let sum: u64 = image.pixels().map(|p| luminance(p) as u64).sum();
    ((sum as f64 / count as f64) + 0.5).floor().clamp(0.0, 255.0) as u8
}

/// Multiplicative brightness: `v * factor`
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct BrightnessConfig {
    #[derivative(Default(value = "1.0"))]
    factor: f32,
}

impl BrightnessConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for BrightnessConfig {
    fn apply(&self, mut image: Raster) -> Result<Raster> {
        for pixel in image.pixels_mut() {
            for i in 0..3 {
                let val = pixel[i] as f32 * self.factor;
                pixel[i] = val.round().clamp(0.0, 255.0) as u8;
            }
        }

        Ok(image)
    }
}

/// Contrast around the mean luminance: `mean + (v - mean) * factor`
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct ContrastConfig {
    #[derivative(Default(value = "1.0"))]
    factor: f32,
}

impl ContrastConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for ContrastConfig {
    fn apply(&self, mut image: Raster) -> Result<Raster> {
        let mean = mean_luminance(&image) as f32;

        for pixel in image.pixels_mut() {
            for i in 0..3 {
                let val = pixel[i] as f32;
                let new_val = mean + (val - mean) * self.factor;
                pixel[i] = new_val.round().clamp(0.0, 255.0) as u8;
            }
        }

        Ok(image)
    }
}
