//! Classical-filter art effects: watercolor, pencil sketch, gothic and modern art.
//!
//! Every primitive consumes a [`Raster`] and hands back a new one. Style pipelines
//! chain the primitives and [`render::render`] picks a pipeline by name.

pub mod base_effect;
pub mod blur_effect;
pub mod channel_effect;
pub mod codec;
pub mod monochrome_effect;
pub mod noise_effect;
pub mod params;
pub mod render;
pub mod style;
pub mod stylized_effect;

pub use params::{ParamKind, ParamSpec, ParamValue, RangePolicy, StyleParams};
pub use render::{RenderOptions, render, render_with, render_with_rng};
pub use style::{Style, StyleDescriptor};

use image::RgbImage;

/// The pipeline buffer. Channel order is always R, G, B; no stage reads or writes BGR.
pub type Raster = RgbImage;

pub type Result<T> = std::result::Result<T, ArtEffectError>;

#[derive(thiserror::Error, Debug)]
pub enum ArtEffectError {
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Unknown style: {0}")]
    UnknownStyle(String),
    #[error("Invalid parameter `{name}` = {value} for {style}: {reason}")]
    InvalidParameter {
        style: String,
        name: String,
        value: String,
        reason: String,
    },
    #[error("Processing error: {0}")]
    Processing(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// A single-input filter stage.
pub trait Effect {
    fn apply(&self, image: Raster) -> Result<Raster>;
}

/// Rejects rasters the filters cannot work on.
pub fn ensure_renderable(image: &Raster) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ArtEffectError::Processing(format!(
            "empty raster {}x{}",
            image.width(),
            image.height()
        )));
    }

    Ok(())
}

/// Reflect-101 border index (`dcb|abcd|cba`). Collapses to clamping on 1-pixel axes.
pub(crate) fn reflect101(index: i64, len: u32) -> u32 {
    let len = len as i64;
    if len <= 1 {
        return 0;
    }

    let mut i = index;
    while i < 0 || i >= len {
        if i < 0 {
            i = -i;
        }
        if i >= len {
            i = 2 * (len - 1) - i;
        }
    }
    i as u32
}
