//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::params::{
    OutputFormat, ResponseFormat, DEFAULT_GUIDANCE, DEFAULT_HEIGHT, DEFAULT_MODEL, DEFAULT_STEPS,
    DEFAULT_WIDTH,
};

/// Environment variable holding the Together AI key.
pub const API_KEY_ENV: &str = "TOGETHER_API_KEY";

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.together.xyz/v1";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,

    /// Remote API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Default node inputs used when CLI flags are absent.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// API key configuration.
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    /// Together AI API key.
    pub together: Option<String>,
}

/// Settings for the generation endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Guidance scale sent with each request.
    pub guidance: f32,
    /// Whether the API returns inline base64 or a URL.
    pub response_format: ResponseFormat,
    /// Image encoding the API should produce.
    pub output_format: OutputFormat,
    /// Per-request timeout. Unbounded when absent.
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            guidance: DEFAULT_GUIDANCE,
            response_format: ResponseFormat::default(),
            output_format: OutputFormat::default(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// The image generation endpoint.
    #[must_use]
    pub fn generations_url(&self) -> String {
        format!("{}/images/generations", self.base_url.trim_end_matches('/'))
    }

    /// The configured timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Default node inputs from the config file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Default model identifier.
    pub model: String,
    /// Default width.
    pub width: u32,
    /// Default height.
    pub height: u32,
    /// Default step count.
    pub steps: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            steps: DEFAULT_STEPS,
        }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Get the Together AI key, preferring the environment variable.
    ///
    /// Surrounding whitespace is trimmed and blank values count as absent.
    #[must_use]
    pub fn together_key(&self) -> Option<String> {
        self.resolve_key(std::env::var(API_KEY_ENV).ok())
    }

    /// Pick between an environment value and the file's `keys.together`.
    fn resolve_key(&self, from_env: Option<String>) -> Option<String> {
        from_env
            .and_then(non_blank)
            .or_else(|| self.keys.together.clone().and_then(non_blank))
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Load a `.env` file into the process environment, if one is present.
///
/// Variables already set in the environment win over the file.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env"),
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `TOGETHER_NODE_CONFIG` environment variable
/// 3. `~/.config/together-node/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("TOGETHER_NODE_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

/// Default config path: `~/.config/together-node/config.toml`.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/together-node/config.toml")
    } else {
        PathBuf::from("together-node.toml")
    }
}
