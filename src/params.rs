//! Input bounds, quantization, and the fixed constants sent with every request.

use serde::{Deserialize, Serialize};

/// Smallest accepted width or height.
pub const MIN_DIMENSION: u32 = 256;
/// Largest accepted width or height.
pub const MAX_DIMENSION: u32 = 2048;
/// Width and height are multiples of this.
pub const DIMENSION_STEP: u32 = 64;
/// Smallest accepted step count.
pub const MIN_STEPS: u32 = 1;
/// Largest accepted step count.
pub const MAX_STEPS: u32 = 100;

/// Prompt used when the host supplies none.
pub const DEFAULT_PROMPT: &str = "An astronaut riding a horse on Mars";
/// Model used when the host supplies none.
pub const DEFAULT_MODEL: &str = "black-forest-labs/FLUX.1-schnell";
/// Default width in pixels.
pub const DEFAULT_WIDTH: u32 = 1024;
/// Default height in pixels.
pub const DEFAULT_HEIGHT: u32 = 768;
/// Default diffusion step count.
pub const DEFAULT_STEPS: u32 = 28;

/// Guidance scale sent with every request.
pub const DEFAULT_GUIDANCE: f32 = 3.5;
/// The node always asks for exactly one image.
pub const IMAGE_COUNT: u32 = 1;

/// How the API should hand back the generated image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseFormat {
    /// Inline base64 in the `b64_json` field.
    #[default]
    #[serde(rename = "b64_json")]
    Base64,
    /// A URL in the `url` field, fetched with a second request.
    #[serde(rename = "url")]
    Url,
}

impl ResponseFormat {
    /// The wire tag for this format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Base64 => "b64_json",
            Self::Url => "url",
        }
    }
}

/// Encoding the API should produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG.
    #[default]
    Png,
    /// JPEG.
    Jpeg,
}

impl OutputFormat {
    /// The wire tag for this format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }
}

/// Clamp a width or height into range and snap it to the nearest step.
#[must_use]
pub fn clamp_dimension(value: i64) -> u32 {
    let clamped = value.clamp(i64::from(MIN_DIMENSION), i64::from(MAX_DIMENSION));
    let step = i64::from(DIMENSION_STEP);
    let snapped = (clamped + step / 2) / step * step;
    // Both bounds are multiples of the step, so snapping stays in range.
    u32::try_from(snapped).unwrap_or(MAX_DIMENSION)
}

/// Clamp a step count into range.
#[must_use]
pub fn clamp_steps(value: i64) -> u32 {
    let clamped = value.clamp(i64::from(MIN_STEPS), i64::from(MAX_STEPS));
    u32::try_from(clamped).unwrap_or(MAX_STEPS)
}

/// Validate the file format used when saving an artifact.
///
/// # Errors
///
/// Returns an error if the format is not recognized.
pub fn validate_format(format: &str) -> Result<(), String> {
    match format {
        "jpeg" | "png" | "webp" => Ok(()),
        _ => Err(format!("Unsupported format '{format}'. Valid: png, jpeg, webp")),
    }
}

/// Get the file extension for a save format.
#[must_use]
pub fn format_extension(format: &str) -> &'static str {
    match format {
        "jpeg" => "jpg",
        "webp" => "webp",
        _ => "png",
    }
}
