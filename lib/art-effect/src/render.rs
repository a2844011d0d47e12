//! Style dispatch
//!
//! `render` is a pure function of its inputs apart from the random source used by
//! Pencil-Sketch and Gothic. Pass a seed through [`RenderOptions`] to pin that down.

use crate::{
    Raster, Result, ensure_renderable,
    params::{RangePolicy, StyleParams},
    style::{Style, StylePipeline},
};
use derivative::Derivative;
use derive_setters::Setters;
use log::info;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::time::Instant;

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct RenderOptions {
    policy: RangePolicy,

    #[setters(strip_option)]
    seed: Option<u64>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn policy(&self) -> RangePolicy {
        self.policy
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

/// Render `image` in the named style, rejecting out-of-range parameters.
pub fn render(image: Raster, style_name: &str, params: &StyleParams) -> Result<Raster> {
    render_with(image, style_name, params, &RenderOptions::default())
}

pub fn render_with(
    image: Raster,
    style_name: &str,
    params: &StyleParams,
    options: &RenderOptions,
) -> Result<Raster> {
    let style = style_name.parse::<Style>()?;

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    render_with_rng(image, style, params, options.policy, &mut rng)
}

pub fn render_with_rng<R: Rng + ?Sized>(
    image: Raster,
    style: Style,
    params: &StyleParams,
    policy: RangePolicy,
    rng: &mut R,
) -> Result<Raster> {
    let pipeline = StylePipeline::from_params(style, params, policy)?;
    ensure_renderable(&image)?;

    let (width, height) = image.dimensions();
    let start = Instant::now();
    let output = pipeline.apply_with_rng(image, rng)?;

    info!(
        "{} rendered {}x{} in {:.2?}",
        style.name(),
        width,
        height,
        start.elapsed()
    );

    Ok(output)
}
