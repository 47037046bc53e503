//! The node's single operation: prompt and parameters in, image artifact out.

use std::sync::Arc;

use crate::artifact::ImageArtifact;
use crate::client::{GenerationRequest, TogetherClient};
use crate::config::{ApiConfig, API_KEY_ENV};
use crate::error::NodeError;
use crate::imaging::{decode_upright, fit_exact};
use crate::node::{NodeInputs, NormalizedInputs};
use crate::ports::HttpTransport;

/// Turns node inputs into an image by calling the generation API.
///
/// Built once per process with the credential already resolved; each call to
/// [`generate`](Self::generate) is independent.
pub struct ImageRequestAdapter {
    client: Option<TogetherClient>,
    api: ApiConfig,
}

impl ImageRequestAdapter {
    /// Create an adapter. Without an `api_key` no request is ever sent.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, api_key: Option<String>, api: ApiConfig) -> Self {
        let client = api_key.map(|key| TogetherClient::new(transport, key, &api));
        Self { client, api }
    }

    /// Produce an image for `inputs`, substituting the red fallback on any failure.
    ///
    /// The returned artifact always has the normalized requested size.
    pub async fn generate(&self, inputs: &NodeInputs) -> ImageArtifact {
        let normalized = inputs.normalize();
        match self.run(&normalized).await {
            Ok(artifact) => artifact,
            Err(e) => {
                tracing::warn!(error = %e, "image generation failed, returning fallback");
                ImageArtifact::fallback(normalized.width, normalized.height)
            }
        }
    }

    /// Produce an image for `inputs`, surfacing failures instead of falling back.
    ///
    /// # Errors
    ///
    /// Returns the first error hit while generating, fetching, or decoding.
    pub async fn try_generate(&self, inputs: &NodeInputs) -> Result<ImageArtifact, NodeError> {
        self.run(&inputs.normalize()).await
    }

    async fn run(&self, inputs: &NormalizedInputs) -> Result<ImageArtifact, NodeError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| NodeError::MissingApiKey { env_var: API_KEY_ENV.into() })?;

        let request = GenerationRequest::new(inputs, &self.api)?;
        let located = client.submit(&request).await?;
        let bytes = client.resolve(located).await?;

        let decoded = decode_upright(&bytes)?;
        tracing::info!(width = decoded.width(), height = decoded.height(), "decoded image");
        let fitted = fit_exact(decoded, inputs.width, inputs.height);
        Ok(ImageArtifact::from_rgb(&fitted))
    }
}
