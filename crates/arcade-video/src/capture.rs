//! PNG screenshots of rendered frames.

use std::fs;
use std::io::BufWriter;
use std::path::Path;

use thiserror::Error;

use crate::bitmap::Bitmap;
use crate::palette::Palette;
use crate::pixel::Pixel;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("cannot write screenshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("PNG encoding failed: {0}")]
    Encoding(#[from] png::EncodingError),
}

/// Resolve a frame through its palette into RGBA bytes.
#[must_use]
pub fn to_rgba<P: Pixel>(frame: &Bitmap<P>, palette: &Palette) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(frame.pixels().len() * 4);
    for &px in frame.pixels() {
        let c = palette.color(px.pen());
        rgba.extend_from_slice(&[c.r, c.g, c.b, 0xFF]);
    }
    rgba
}

/// Save a frame as an RGBA PNG.
pub fn save_png<P: Pixel>(frame: &Bitmap<P>, palette: &Palette, path: &Path) -> Result<(), CaptureError> {
    let file = fs::File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), frame.width() as u32, frame.height() as u32);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&to_rgba(frame, palette))?;
    log::debug!("saved {}x{} frame to {}", frame.width(), frame.height(), path.display());
    Ok(())
}
