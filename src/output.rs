//! File naming and artifact saving.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::{DynamicImage, ImageFormat};

use crate::artifact::ImageArtifact;
use crate::error::NodeError;
use crate::params::format_extension;

/// Generate an output filename from a prompt and format.
///
/// Sanitizes the first 50 characters of the prompt to kebab-case,
/// appends a unix timestamp, and adds the appropriate file extension.
#[must_use]
pub fn auto_filename(prompt: &str, format: &str) -> String {
    let sanitized = sanitize_for_filename(prompt, 50);
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    let ext = format_extension(format);
    format!("{sanitized}-{timestamp}.{ext}")
}

/// Sanitize a string for use in a filename.
///
/// Lowercases, turns runs of non-alphanumerics into one hyphen, and trims to
/// `max_len`.
#[must_use]
pub fn sanitize_for_filename(input: &str, max_len: usize) -> String {
    let mut result = String::with_capacity(max_len);
    let mut last_was_hyphen = true;

    for ch in input.chars() {
        if result.len() >= max_len {
            break;
        }
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            result.push('-');
            last_was_hyphen = true;
        }
    }

    while result.ends_with('-') {
        result.pop();
    }

    if result.is_empty() {
        "image".to_string()
    } else {
        result
    }
}

/// Resolve the output path: use explicit path or auto-generate.
#[must_use]
pub fn resolve_output_path(explicit: Option<&str>, prompt: &str, format: &str) -> PathBuf {
    match explicit {
        Some(p) => PathBuf::from(p),
        None => PathBuf::from(auto_filename(prompt, format)),
    }
}

/// Encode an artifact as `format` and write it to `output_path`.
///
/// # Errors
///
/// Returns an error if the format is unknown or the file cannot be written.
pub fn save_artifact(
    artifact: &ImageArtifact,
    format: &str,
    output_path: &Path,
) -> Result<(), NodeError> {
    let image_format = match format {
        "png" => ImageFormat::Png,
        "jpeg" => ImageFormat::Jpeg,
        "webp" => ImageFormat::WebP,
        other => return Err(NodeError::InvalidArgument(format!("Unsupported format: {other}"))),
    };

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    DynamicImage::ImageRgb8(artifact.to_rgb8())
        .save_with_format(output_path, image_format)
        .map_err(|e| NodeError::Io(std::io::Error::other(format!("Failed to save as {format}: {e}"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_basic() {
        assert_eq!(sanitize_for_filename("Hello World", 50), "hello-world");
    }

    #[test]
    fn sanitize_special_chars() {
        assert_eq!(
            sanitize_for_filename("An astronaut, riding a horse... on Mars!", 50),
            "an-astronaut-riding-a-horse-on-mars"
        );
    }

    #[test]
    fn sanitize_truncates() {
        let long = "a".repeat(100);
        assert_eq!(sanitize_for_filename(&long, 10).len(), 10);
    }

    #[test]
    fn sanitize_empty() {
        assert_eq!(sanitize_for_filename("", 50), "image");
        assert_eq!(sanitize_for_filename("!!!", 50), "image");
    }

    #[test]
    fn auto_filename_png() {
        let name = auto_filename("a cat", "png");
        assert!(name.starts_with("a-cat-"));
        assert_eq!(Path::new(&name).extension().unwrap(), "png");
    }

    #[test]
    fn resolve_explicit() {
        let path = resolve_output_path(Some("my-image.png"), "ignored", "png");
        assert_eq!(path, PathBuf::from("my-image.png"));
    }

    #[test]
    fn resolve_auto_jpeg() {
        let path = resolve_output_path(None, "a cat", "jpeg");
        assert!(path.to_str().unwrap().starts_with("a-cat-"));
        assert_eq!(path.extension().unwrap(), "jpg");
    }

    #[test]
    fn save_png_round_trips_pixels() {
        let dir = std::env::temp_dir().join("together_node_save_test");
        let path = dir.join("out/fallback.png");
        let _ = std::fs::remove_dir_all(&dir);

        save_artifact(&ImageArtifact::fallback(256, 320), "png", &path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (256, 320));
        assert_eq!(img.get_pixel(100, 100).0, [255, 0, 0]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_unknown_format_fails() {
        let path = std::env::temp_dir().join("together_node_never_written.gif");
        let err = save_artifact(&ImageArtifact::fallback(1, 1), "gif", &path).unwrap_err();
        assert!(matches!(err, NodeError::InvalidArgument(_)));
    }
}
