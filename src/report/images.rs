// Photo embedding for reports
// Photos are downsampled and inlined as base64 data URIs so a report is a
// single self-contained file.
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::fs;
use std::io::Cursor;
use std::path::Path;

use super::ReportResult;

/// Target size for an image wider than `max_width`, keeping its aspect ratio.
/// `None` when the image already fits. A `max_width` of 0 means no limit.
pub fn downsampled_size(width: u32, height: u32, max_width: u32) -> Option<(u32, u32)> {
    if max_width == 0 || width <= max_width || width == 0 {
        return None;
    }
    let new_height = (u64::from(height) * u64::from(max_width) / u64::from(width)).max(1);
    Some((max_width, new_height as u32))
}

/// Load an image file and return it as a `data:` URI, downsampled to at
/// most `max_width` pixels wide
pub fn embed_image(path: &Path, max_width: u32) -> ReportResult<String> {
    let bytes = fs::read(path)?;
    let format = image::guess_format(&bytes)?;
    let img = image::load_from_memory_with_format(&bytes, format)?;

    let (width, height) = img.dimensions();
    let (format, encoded) = match downsampled_size(width, height, max_width) {
        Some((new_width, new_height)) => {
            let resized = img.resize(new_width, new_height, FilterType::Lanczos3);
            encode(&resized, format)?
        }
        None => (format, bytes),
    };

    Ok(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        BASE64.encode(&encoded)
    ))
}

/// Re-encode in the source format, falling back to JPEG when that fails
fn encode(img: &DynamicImage, format: ImageFormat) -> ReportResult<(ImageFormat, Vec<u8>)> {
    let mut buffer = Cursor::new(Vec::new());
    if img.write_to(&mut buffer, format).is_ok() {
        return Ok((format, buffer.into_inner()));
    }

    log::debug!("Cannot re-encode {:?}, falling back to JPEG", format);
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img.to_rgb8()).write_to(&mut buffer, ImageFormat::Jpeg)?;
    Ok((ImageFormat::Jpeg, buffer.into_inner()))
}
