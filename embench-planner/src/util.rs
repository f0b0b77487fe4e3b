//! Utilities.
use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use embench_core::util::encode_png;
use image::RgbImage;

/// Encodes a frame as a `data:image/png;base64,...` URL.
pub fn image_to_data_url(frame: &RgbImage) -> Result<String> {
    let png = encode_png(frame)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}
