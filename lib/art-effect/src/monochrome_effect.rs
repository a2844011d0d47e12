use crate::{Effect, Raster, Result, base_effect};
use image::{GrayImage, Rgb};

/// Two-color gradient map: black maps to `from`, white maps to `to`.
#[derive(Debug, Clone, Copy)]
pub struct GradientMapConfig {
    pub from: [u8; 3],
    pub to: [u8; 3],
}

impl Default for GradientMapConfig {
    fn default() -> Self {
        Self {
            from: [0, 0, 0],
            to: [255, 255, 255],
        }
    }
}

impl GradientMapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_from_rgb(mut self, r: u8, g: u8, b: u8) -> Self {
        self.from = [r, g, b];
        self
    }

    pub fn with_to_rgb(mut self, r: u8, g: u8, b: u8) -> Self {
        self.to = [r, g, b];
        self
    }

    fn lut(&self) -> [[u8; 3]; 256] {
        let mut lut = [[0u8; 3]; 256];
        for (i, entry) in lut.iter_mut().enumerate() {
            let t = i as f32 / 255.0;
            for c in 0..3 {
                let (a, b) = (self.from[c] as f32, self.to[c] as f32);
                entry[c] = (a + (b - a) * t).round().clamp(0.0, 255.0) as u8;
            }
        }
        lut
    }

    pub fn apply_gray(&self, gray: &GrayImage) -> Raster {
        let lut = self.lut();
        Raster::from_fn(gray.width(), gray.height(), |x, y| {
            Rgb(lut[gray.get_pixel(x, y)[0] as usize])
        })
    }
}

impl Effect for GradientMapConfig {
    fn apply(&self, image: Raster) -> Result<Raster> {
        Ok(self.apply_gray(&base_effect::to_gray(&image)))
    }
}
