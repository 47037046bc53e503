//! LoRA adapters applied on top of the base model.
//!
//! The host passes them as two comma-separated text inputs: adapter URLs and
//! their scales, matched by position.

use serde::Serialize;

use crate::error::NodeError;

/// Scale applied when none is given for an adapter.
pub const DEFAULT_LORA_SCALE: f32 = 1.0;

/// One LoRA adapter as sent in the request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lora {
    /// Where the adapter weights live.
    pub path: String,
    /// Blend strength.
    pub scale: f32,
}

/// Pair up comma-separated URLs and scales by position.
///
/// A blank URL entry is skipped together with the scale in its position. A
/// blank or missing scale means [`DEFAULT_LORA_SCALE`].
///
/// # Errors
///
/// Returns [`NodeError::InvalidArgument`] if a scale is not a finite number
/// or there are more scales than URLs.
pub fn parse_loras(urls: &str, scales: &str) -> Result<Vec<Lora>, NodeError> {
    let urls = split_positions(urls);
    let scales = split_positions(scales)
        .into_iter()
        .map(|s| {
            if s.is_empty() {
                return Ok(DEFAULT_LORA_SCALE);
            }
            s.parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| NodeError::InvalidArgument(format!("Invalid LoRA scale '{s}'")))
        })
        .collect::<Result<Vec<f32>, _>>()?;

    if scales.len() > urls.len() {
        return Err(NodeError::InvalidArgument(format!(
            "{} LoRA scales given for {} URLs",
            scales.len(),
            urls.len()
        )));
    }

    Ok(urls
        .into_iter()
        .enumerate()
        .filter(|(_, path)| !path.is_empty())
        .map(|(i, path)| Lora {
            path: path.to_string(),
            scale: scales.get(i).copied().unwrap_or(DEFAULT_LORA_SCALE),
        })
        .collect())
}

/// Trimmed entries in their original positions, minus trailing blanks.
fn split_positions(raw: &str) -> Vec<&str> {
    let mut entries: Vec<&str> = raw.split(',').map(str::trim).collect();
    while entries.last().is_some_and(|s| s.is_empty()) {
        entries.pop();
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_urls_with_scales() {
        let loras = parse_loras(
            "https://example.com/lora1.safetensors, https://example.com/lora2.safetensors",
            "0.8, 1.2",
        )
        .unwrap();
        assert_eq!(
            loras,
            vec![
                Lora { path: "https://example.com/lora1.safetensors".into(), scale: 0.8 },
                Lora { path: "https://example.com/lora2.safetensors".into(), scale: 1.2 },
            ]
        );
    }

    #[test]
    fn empty_inputs_mean_no_loras() {
        assert!(parse_loras("", "").unwrap().is_empty());
        assert!(parse_loras(" , ", "").unwrap().is_empty());
    }

    #[test]
    fn missing_scales_default_to_one() {
        let loras = parse_loras("a, b", "0.5").unwrap();
        assert_eq!(loras[0].scale, 0.5);
        assert_eq!(loras[1].scale, DEFAULT_LORA_SCALE);
    }

    #[test]
    fn blank_scale_keeps_later_scales_in_place() {
        let loras = parse_loras("a, b, c", "0.5, , 0.7").unwrap();
        let scales: Vec<f32> = loras.iter().map(|l| l.scale).collect();
        assert_eq!(scales, [0.5, DEFAULT_LORA_SCALE, 0.7]);
    }

    #[test]
    fn blank_url_drops_its_own_scale() {
        let loras = parse_loras("a, , c", "0.5, 0.6, 0.7").unwrap();
        assert_eq!(
            loras,
            vec![Lora { path: "a".into(), scale: 0.5 }, Lora { path: "c".into(), scale: 0.7 }]
        );
    }

    #[test]
    fn trailing_blank_scales_are_not_counted() {
        let loras = parse_loras("a", "0.5, ,").unwrap();
        assert_eq!(loras, vec![Lora { path: "a".into(), scale: 0.5 }]);
    }

    #[test]
    fn bad_scale_is_rejected() {
        assert!(matches!(parse_loras("a", "strong"), Err(NodeError::InvalidArgument(_))));
        assert!(matches!(parse_loras("a", "NaN"), Err(NodeError::InvalidArgument(_))));
    }

    #[test]
    fn extra_scales_are_rejected() {
        let err = parse_loras("a", "0.5, 0.7").unwrap_err();
        assert!(err.to_string().contains("2 LoRA scales given for 1 URLs"));
    }
}
