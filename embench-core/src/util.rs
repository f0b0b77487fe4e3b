//! Utilities for persisting frames.
use anyhow::{Context, Result};
use image::{
    codecs::gif::GifEncoder, Delay, Frame, ImageOutputFormat, DynamicImage, Rgba, RgbImage,
    RgbaImage,
};
use std::{fs::File, io::BufWriter, path::Path};

/// Saves an RGB frame, the format is given by the extension of `path`.
pub fn save_frame(frame: &RgbImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    frame
        .save(path)
        .with_context(|| format!("Failed to save frame to {:?}", path))
}

/// Encodes an RGB frame as PNG.
pub fn encode_png(frame: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(frame.clone()).write_to(&mut buf, ImageOutputFormat::Png)?;
    Ok(buf)
}

fn to_rgba(frame: &RgbImage) -> RgbaImage {
    RgbaImage::from_fn(frame.width(), frame.height(), |x, y| {
        let p = frame.get_pixel(x, y);
        Rgba([p[0], p[1], p[2], 255])
    })
}

/// Writes the frames as an animated GIF played at `fps`.
///
/// Does nothing when `frames` is empty.
pub fn write_gif(frames: &[RgbImage], path: impl AsRef<Path>, fps: u32) -> Result<()> {
    if frames.is_empty() {
        return Ok(());
    }
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut encoder = GifEncoder::new(BufWriter::new(file));
    let delay = Delay::from_numer_denom_ms(1000, fps.max(1));
    encoder.encode_frames(
        frames
            .iter()
            .map(|f| Frame::from_parts(to_rgba(f), 0, 0, delay)),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_save_and_encode() -> Result<()> {
        let dir = TempDir::new("frames")?;
        let frame = RgbImage::from_pixel(8, 6, image::Rgb([10, 20, 30]));
        let path = dir.path().join("f.png");
        save_frame(&frame, &path)?;
        let loaded = image::open(&path)?.to_rgb8();
        assert_eq!(loaded.dimensions(), (8, 6));
        assert_eq!(loaded.get_pixel(3, 3), &image::Rgb([10, 20, 30]));

        let png = encode_png(&frame)?;
        assert_eq!(&png[1..4], b"PNG");

        let gif = dir.path().join("v.gif");
        write_gif(&[frame.clone(), frame], &gif, 10)?;
        assert!(gif.exists());
        write_gif(&[], dir.path().join("none.gif"), 10)?;
        assert!(!dir.path().join("none.gif").exists());
        Ok(())
    }
}
