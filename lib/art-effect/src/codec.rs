//! Byte-level helpers for the upload and download sides of a render.

use crate::{ArtEffectError, Raster, Result, style::Style};
use image::codecs::jpeg::JpegEncoder;

pub const JPEG_MIME: &str = "image/jpeg";
pub const DEFAULT_PREVIEW_QUALITY: u8 = 50;

/// Decode PNG or JPEG bytes into an RGB raster.
pub fn decode(bytes: &[u8]) -> Result<Raster> {
    let image = image::load_from_memory(bytes).map_err(|e| ArtEffectError::Decode(e.to_string()))?;
    Ok(image.to_rgb8())
}

pub fn encode_jpeg(image: &Raster, quality: u8) -> Result<Vec<u8>> {
    if !(1..=100).contains(&quality) {
        return Err(ArtEffectError::Processing(format!(
            "jpeg quality must be in 1..=100, got {quality}"
        )));
    }

    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality).encode_image(image)?;
    Ok(buffer)
}

/// Run the raster through a lossy JPEG round trip, as the preview path does.
pub fn compress_for_preview(image: &Raster, quality: u8) -> Result<Raster> {
    let bytes = encode_jpeg(image, quality)?;
    decode(&bytes)
}

pub fn suggested_file_name(style: Style) -> String {
    format!("{}.jpg", style.file_stem())
}
