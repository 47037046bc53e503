//! Decoding of returned image bytes into an upright RGB buffer of the
//! requested size.

use std::io::Cursor;

use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage};

use crate::error::NodeError;

/// Decode bytes in any supported format, honoring EXIF orientation.
///
/// Unreadable orientation metadata leaves the image as stored.
///
/// # Errors
///
/// Returns [`NodeError::Decode`] if the format is unknown or the data is corrupt.
pub fn decode_upright(bytes: &[u8]) -> Result<RgbImage, NodeError> {
    let mut decoder = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?.into_decoder()?;
    let orientation = decoder.orientation().unwrap_or_else(|e| {
        tracing::debug!(error = %e, "ignoring unreadable orientation metadata");
        Orientation::NoTransforms
    });
    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);
    Ok(img.to_rgb8())
}

/// Resize to exactly `width` x `height` unless the image already matches.
#[must_use]
pub fn fit_exact(img: RgbImage, width: u32, height: u32) -> RgbImage {
    if img.dimensions() == (width, height) {
        return img;
    }
    tracing::debug!(
        from_width = img.width(),
        from_height = img.height(),
        width,
        height,
        "resizing decoded image"
    );
    image::imageops::resize(&img, width, height, FilterType::Lanczos3)
}
