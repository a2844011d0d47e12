use crate::{ArtEffectError, Effect, Raster, Result, reflect101};
use derivative::Derivative;
use derive_setters::Setters;
use image::GrayImage;

const DT_ITERATIONS: i32 = 3;

// Below this the range/space ratio stops being representable in f64 positions.
const MIN_SIGMA_R: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Border {
    /// Mirror around the edge pixel.
    Reflect101,
    /// Leave the outermost rows and columns as they were.
    Keep,
}

/// 3x3 correlation over an interleaved buffer: `offset + gain * sum(kernel * window)`.
fn convolve3x3(
    src: &[u8],
    width: u32,
    height: u32,
    channels: usize,
    kernel: &[f32; 9],
    gain: f32,
    offset: f32,
    border: Border,
) -> Vec<u8> {
    let w = width as usize;
    let mut out = src.to_vec();

    for y in 0..height {
        for x in 0..width {
            let on_edge = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
            if border == Border::Keep && on_edge {
                continue;
            }

            for c in 0..channels {
                let mut sum = 0.0f32;
                for ky in -1i64..=1 {
                    for kx in -1i64..=1 {
                        let px = reflect101(x as i64 + kx, width) as usize;
                        let py = reflect101(y as i64 + ky, height) as usize;
                        let ki = ((ky + 1) * 3 + (kx + 1)) as usize;
                        sum += src[(py * w + px) * channels + c] as f32 * kernel[ki];
                    }
                }

                let val = offset + gain * sum;
                out[(y as usize * w + x as usize) * channels + c] = val.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    out
}

fn from_raw_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Raster> {
    Raster::from_raw(width, height, data)
        .ok_or_else(|| ArtEffectError::Processing(format!("bad buffer for {width}x{height} raster")))
}

/// Sharpen effect configuration. `amount = 1` is `[[0,-1,0],[-1,5,-1],[0,-1,0]]`.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct SharpenConfig {
    #[derivative(Default(value = "1.0"))]
    amount: f32,
}

impl SharpenConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn kernel(&self) -> [f32; 9] {
        let a = self.amount;
        [0.0, -a, 0.0, -a, 1.0 + 4.0 * a, -a, 0.0, -a, 0.0]
    }

    pub fn apply_gray(&self, gray: &GrayImage) -> Result<GrayImage> {
        let (width, height) = gray.dimensions();
        let data = convolve3x3(gray.as_raw(), width, height, 1, &self.kernel(), 1.0, 0.0, Border::Reflect101);

        GrayImage::from_raw(width, height, data)
            .ok_or_else(|| ArtEffectError::Processing("sharpen buffer size".to_string()))
    }
}

impl Effect for SharpenConfig {
    fn apply(&self, image: Raster) -> Result<Raster> {
        let (width, height) = image.dimensions();
        let data = convolve3x3(image.as_raw(), width, height, 3, &self.kernel(), 1.0, 0.0, Border::Reflect101);
        from_raw_rgb(width, height, data)
    }
}

/// Emboss relief around mid-gray; `strength` scales the kernel response.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct EmbossConfig {
    #[derivative(Default(value = "1.0"))]
    strength: f32,
}

impl EmbossConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for EmbossConfig {
    fn apply(&self, image: Raster) -> Result<Raster> {
        let kernel: [f32; 9] = [-1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        let (width, height) = image.dimensions();
        let data = convolve3x3(image.as_raw(), width, height, 3, &kernel, self.strength, 128.0, Border::Keep);
        from_raw_rgb(width, height, data)
    }
}

/// Laplacian-style find-edges kernel
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct EdgeDetectionConfig {
    #[derivative(Default(value = "1.0"))]
    strength: f32,
}

impl EdgeDetectionConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for EdgeDetectionConfig {
    fn apply(&self, image: Raster) -> Result<Raster> {
        let kernel: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];
        let (width, height) = image.dimensions();
        let data = convolve3x3(image.as_raw(), width, height, 3, &kernel, self.strength, 0.0, Border::Keep);
        from_raw_rgb(width, height, data)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeEnhanceConfig;

impl EdgeEnhanceConfig {
    pub fn new() -> Self {
        Self
    }
}

impl Effect for EdgeEnhanceConfig {
    fn apply(&self, image: Raster) -> Result<Raster> {
        let kernel: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 10.0, -1.0, -1.0, -1.0, -1.0];
        let (width, height) = image.dimensions();
        let data = convolve3x3(image.as_raw(), width, height, 3, &kernel, 0.5, 0.0, Border::Keep);
        from_raw_rgb(width, height, data)
    }
}

/// Interleaved RGB plane in `[0, 1]`.
struct FloatPlane {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl FloatPlane {
    fn from_raster(image: &Raster) -> Self {
        Self {
            width: image.width() as usize,
            height: image.height() as usize,
            data: image.as_raw().iter().map(|&v| v as f32 / 255.0).collect(),
        }
    }

    #[inline]
    fn at(&self, x: usize, y: usize, c: usize) -> f32 {
        self.data[(y * self.width + x) * 3 + c]
    }

    fn to_raster(&self) -> Result<Raster> {
        let data = self
            .data
            .iter()
            .map(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
            .collect();
        from_raw_rgb(self.width as u32, self.height as u32, data)
    }
}

/// Box filter of radius `radius` along one line in transformed coordinates.
fn box_line(positions: &[f64], line: &mut [[f32; 3]], radius: f64) {
    let n = line.len();
    let mut prefix = vec![[0f64; 3]; n + 1];
    for i in 0..n {
        for c in 0..3 {
            prefix[i + 1][c] = prefix[i][c] + line[i][c] as f64;
        }
    }

    let (mut lo, mut hi) = (0usize, 0usize);
    for i in 0..n {
        while positions[lo] < positions[i] - radius {
            lo += 1;
        }
        if hi < i {
            hi = i;
        }
        while hi + 1 < n && positions[hi + 1] <= positions[i] + radius {
            hi += 1;
        }

        let count = (hi - lo + 1) as f64;
        for c in 0..3 {
            line[i][c] = ((prefix[hi + 1][c] - prefix[lo][c]) / count) as f32;
        }
    }
}

/// Domain-transform normalized convolution.
fn domain_transform(image: &Raster, sigma_s: f32, sigma_r: f32) -> FloatPlane {
    let mut plane = FloatPlane::from_raster(image);
    let (w, h) = (plane.width, plane.height);
    let ratio = sigma_s as f64 / sigma_r.max(MIN_SIGMA_R) as f64;

    // Positions are accumulated once from the input; each pass reuses them.
    let mut ct_h = vec![0f64; w * h];
    for y in 0..h {
        for x in 1..w {
            let d: f32 = (0..3).map(|c| (plane.at(x, y, c) - plane.at(x - 1, y, c)).abs()).sum();
            ct_h[y * w + x] = ct_h[y * w + x - 1] + 1.0 + ratio * d as f64;
        }
    }

    let mut ct_v = vec![0f64; w * h];
    for x in 0..w {
        for y in 1..h {
            let d: f32 = (0..3).map(|c| (plane.at(x, y, c) - plane.at(x, y - 1, c)).abs()).sum();
            ct_v[x * h + y] = ct_v[x * h + y - 1] + 1.0 + ratio * d as f64;
        }
    }

    let n = DT_ITERATIONS;
    let mut line = Vec::with_capacity(w.max(h));
    for i in 0..n {
        let sigma_h = sigma_s as f64 * 3f64.sqrt() * 2f64.powi(n - i - 1) / (4f64.powi(n) - 1.0).sqrt();
        let radius = 3f64.sqrt() * sigma_h;

        for y in 0..h {
            line.clear();
            line.extend((0..w).map(|x| [plane.at(x, y, 0), plane.at(x, y, 1), plane.at(x, y, 2)]));
            box_line(&ct_h[y * w..(y + 1) * w], &mut line, radius);
            for (x, px) in line.iter().enumerate() {
                plane.data[(y * w + x) * 3..(y * w + x) * 3 + 3].copy_from_slice(px);
            }
        }

        for x in 0..w {
            line.clear();
            line.extend((0..h).map(|y| [plane.at(x, y, 0), plane.at(x, y, 1), plane.at(x, y, 2)]));
            box_line(&ct_v[x * h..(x + 1) * h], &mut line, radius);
            for (y, px) in line.iter().enumerate() {
                plane.data[(y * w + x) * 3..(y * w + x) * 3 + 3].copy_from_slice(px);
            }
        }
    }

    plane
}

/// Edge-preserving smoothing.
///
/// `sigma_s` is the spatial extent of the smoothing, `sigma_r` how different two
/// colors may be and still count as the same region.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct EdgePreservingConfig {
    #[derivative(Default(value = "50.0"))]
    sigma_s: f32,

    #[derivative(Default(value = "0.5"))]
    sigma_r: f32,
}

impl EdgePreservingConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for EdgePreservingConfig {
    fn apply(&self, image: Raster) -> Result<Raster> {
        domain_transform(&image, self.sigma_s, self.sigma_r).to_raster()
    }
}

/// Flattened, poster-like rendering: smoothing then darkening along color gradients.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct StylizationConfig {
    #[derivative(Default(value = "100.0"))]
    sigma_s: f32,

    #[derivative(Default(value = "0.5"))]
    sigma_r: f32,
}

impl StylizationConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for StylizationConfig {
    fn apply(&self, image: Raster) -> Result<Raster> {
        let mut plane = domain_transform(&image, self.sigma_s, self.sigma_r);
        let (w, h) = (plane.width, plane.height);

        // Sobel magnitude summed over the channels.
        let mut magnitude = vec![0f32; w * h];
        for y in 0..h {
            for x in 0..w {
                let xm = reflect101(x as i64 - 1, w as u32) as usize;
                let xp = reflect101(x as i64 + 1, w as u32) as usize;
                let ym = reflect101(y as i64 - 1, h as u32) as usize;
                let yp = reflect101(y as i64 + 1, h as u32) as usize;

                for c in 0..3 {
                    let gx = plane.at(xp, ym, c) + 2.0 * plane.at(xp, y, c) + plane.at(xp, yp, c)
                        - plane.at(xm, ym, c)
                        - 2.0 * plane.at(xm, y, c)
                        - plane.at(xm, yp, c);
                    let gy = plane.at(xm, yp, c) + 2.0 * plane.at(x, yp, c) + plane.at(xp, yp, c)
                        - plane.at(xm, ym, c)
                        - 2.0 * plane.at(x, ym, c)
                        - plane.at(xp, ym, c);
                    magnitude[y * w + x] += (gx * gx + gy * gy).sqrt();
                }
            }
        }

        for (i, m) in magnitude.iter().enumerate() {
            let keep = (1.0 - m).clamp(0.0, 1.0);
            for c in 0..3 {
                plane.data[i * 3 + c] *= keep;
            }
        }

        plane.to_raster()
    }
}
