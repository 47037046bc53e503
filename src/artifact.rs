//! The image artifact handed back to the host.
//!
//! One canonical representation: row-major height x width x channel, three
//! `f32` channels per pixel, every sample in `[0, 1]`. Other layouts are
//! produced only through the conversion functions below.

use image::RgbImage;

/// Number of channels in every artifact.
pub const CHANNELS: usize = 3;

/// RGB sample triple used by the fallback image.
pub const FALLBACK_COLOR: [f32; CHANNELS] = [1.0, 0.0, 0.0];

/// A three-channel image in HWC layout with unit-range samples.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageArtifact {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl ImageArtifact {
    /// Convert a decoded RGB image, scaling bytes into `[0, 1]`.
    #[must_use]
    pub fn from_rgb(img: &RgbImage) -> Self {
        let data = img.as_raw().iter().map(|&b| f32::from(b) / 255.0).collect();
        Self { width: img.width(), height: img.height(), data }
    }

    /// A uniform image of the given size filled with one color.
    #[must_use]
    pub fn solid(width: u32, height: u32, color: [f32; CHANNELS]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * CHANNELS);
        for _ in 0..pixels {
            data.extend_from_slice(&color);
        }
        Self { width, height, data }
    }

    /// The full-red placeholder returned when generation cannot complete.
    #[must_use]
    pub fn fallback(width: u32, height: u32) -> Self {
        Self::solid(width, height, FALLBACK_COLOR)
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tensor shape as `[height, width, channels]`.
    #[must_use]
    pub fn shape(&self) -> [usize; 3] {
        [self.height as usize, self.width as usize, CHANNELS]
    }

    /// Raw HWC samples.
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    /// The RGB triple at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; CHANNELS]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    /// Whether every pixel has the same color.
    #[must_use]
    pub fn is_uniform(&self) -> bool {
        match self.data.get(..CHANNELS) {
            Some(first) => self.data.chunks_exact(CHANNELS).all(|px| px == first),
            None => true,
        }
    }

    /// Re-lay the samples channel-major as `[channels, height, width]`.
    #[must_use]
    pub fn to_chw(&self) -> Vec<f32> {
        let plane = self.width as usize * self.height as usize;
        let mut out = vec![0.0; plane * CHANNELS];
        for (i, px) in self.data.chunks_exact(CHANNELS).enumerate() {
            for (c, &v) in px.iter().enumerate() {
                out[c * plane + i] = v;
            }
        }
        out
    }

    /// Convert back to 8-bit RGB for encoding to a file.
    #[must_use]
    pub fn to_rgb8(&self) -> RgbImage {
        let bytes = self
            .data
            .iter()
            // Samples are clamped to [0, 1] so the cast cannot truncate.
            .map(|&v| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let b = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
                b
            })
            .collect();
        RgbImage::from_raw(self.width, self.height, bytes)
            .unwrap_or_else(|| RgbImage::new(self.width, self.height))
    }
}
