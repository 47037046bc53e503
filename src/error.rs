//! Unified error type for the node.

use thiserror::Error;

/// Errors that can occur while producing an image artifact.
///
/// None of these reach the host: [`crate::generator::ImageRequestAdapter::generate`]
/// maps every variant to the fallback artifact.
#[derive(Debug, Error)]
pub enum NodeError {
    /// No API key is configured.
    #[error("No API key for Together AI. Set {env_var} or add keys.together to the config file.")]
    MissingApiKey {
        /// The environment variable name.
        env_var: String,
    },

    /// The remote service rejected the credential.
    #[error("Authentication failed ({status}): {message}")]
    Authentication {
        /// HTTP status code.
        status: u16,
        /// Error body from the API.
        message: String,
    },

    /// An API returned a non-success response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// The API answered successfully but the payload was not usable.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The returned bytes could not be decoded as an image.
    #[error("Image decode error: {0}")]
    Decode(String),

    /// A cassette could not serve the requested exchange.
    #[error("Replay error: {0}")]
    Replay(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<image::ImageError> for NodeError {
    fn from(e: image::ImageError) -> Self {
        Self::Decode(e.to_string())
    }
}
