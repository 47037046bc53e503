//! Together AI image generation: request construction and response
//! interpretation over an [`HttpTransport`].

use std::sync::Arc;

use base64::Engine;
use serde::Deserialize;
use serde_json::json;

use crate::config::ApiConfig;
use crate::error::NodeError;
use crate::lora::{parse_loras, Lora};
use crate::node::NormalizedInputs;
use crate::params::{OutputFormat, ResponseFormat, IMAGE_COUNT};
use crate::ports::transport::{HttpReply, HttpRequest, HttpTransport};

/// How much of an error body is kept in error messages.
const BODY_EXCERPT_LEN: usize = 500;

/// One image generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Model identifier.
    pub model: String,
    /// Text prompt.
    pub prompt: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Diffusion steps.
    pub steps: u32,
    /// Guidance scale.
    pub guidance: f32,
    /// Encoding of the generated image.
    pub output_format: OutputFormat,
    /// Inline data or URL.
    pub response_format: ResponseFormat,
    /// LoRA adapters; omitted from the body when empty.
    pub loras: Vec<Lora>,
}

impl GenerationRequest {
    /// Combine normalized node inputs with the fixed API settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the LoRA inputs cannot be parsed.
    pub fn new(inputs: &NormalizedInputs, api: &ApiConfig) -> Result<Self, NodeError> {
        Ok(Self {
            model: inputs.model.clone(),
            prompt: inputs.prompt.clone(),
            width: inputs.width,
            height: inputs.height,
            steps: inputs.steps,
            guidance: api.guidance,
            output_format: api.output_format,
            response_format: api.response_format,
            loras: parse_loras(&inputs.lora_urls, &inputs.lora_scales)?,
        })
    }

    /// The JSON body sent to the generations endpoint.
    #[must_use]
    pub fn to_body(&self) -> serde_json::Value {
        let mut body = json!({
            "model": self.model,
            "prompt": self.prompt,
            "steps": self.steps,
            "n": IMAGE_COUNT,
            "width": self.width,
            "height": self.height,
            "guidance": self.guidance,
            "output_format": self.output_format.as_str(),
            "response_format": self.response_format.as_str(),
        });
        if !self.loras.is_empty() {
            body["image_loras"] = json!(self.loras);
        }
        body
    }
}

/// Where the generated image can be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    /// Base64 payload carried in the response itself.
    Inline(String),
    /// A URL that must be fetched.
    Url(String),
}

/// Talks to the Together AI images API.
pub struct TogetherClient {
    transport: Arc<dyn HttpTransport>,
    api_key: String,
    endpoint: String,
}

impl TogetherClient {
    /// Create a client that authenticates with `api_key`.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, api_key: String, api: &ApiConfig) -> Self {
        Self { transport, api_key, endpoint: api.generations_url() }
    }

    /// Submit a generation request and locate the resulting asset.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a rejected credential, any
    /// non-success status, or a response without the expected field.
    pub async fn submit(&self, request: &GenerationRequest) -> Result<GenerationResult, NodeError> {
        tracing::info!(
            model = %request.model,
            width = request.width,
            height = request.height,
            steps = request.steps,
            loras = request.loras.len(),
            "submitting generation request"
        );

        let http = HttpRequest::post_json(&self.endpoint, &self.api_key, request.to_body());
        let reply = self.transport.send(&http).await?;
        interpret_reply(&reply, request.response_format)
    }

    /// Turn a located asset into raw image bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if inline data is not valid base64 or the URL fetch fails.
    pub async fn resolve(&self, result: GenerationResult) -> Result<Vec<u8>, NodeError> {
        match result {
            GenerationResult::Inline(data) => base64::engine::general_purpose::STANDARD
                .decode(data.trim())
                .map_err(|e| NodeError::MalformedResponse(format!("Failed to decode base64: {e}"))),
            GenerationResult::Url(url) => {
                tracing::info!(%url, "fetching generated image");
                let reply = self.transport.send(&HttpRequest::get(url)).await?;
                if !reply.is_success() {
                    return Err(NodeError::Api {
                        status: reply.status,
                        message: format!(
                            "Failed to download image: {}",
                            reply.body_excerpt(BODY_EXCERPT_LEN)
                        ),
                    });
                }
                Ok(reply.body)
            }
        }
    }
}

/// Classify a generations reply and pull out the first image entry.
///
/// # Errors
///
/// 401 and 403 map to [`NodeError::Authentication`], other non-success
/// statuses to [`NodeError::Api`], and unusable 2xx bodies to
/// [`NodeError::MalformedResponse`].
pub fn interpret_reply(
    reply: &HttpReply,
    format: ResponseFormat,
) -> Result<GenerationResult, NodeError> {
    if matches!(reply.status, 401 | 403) {
        return Err(NodeError::Authentication {
            status: reply.status,
            message: reply.body_excerpt(BODY_EXCERPT_LEN),
        });
    }
    if !reply.is_success() {
        return Err(NodeError::Api {
            status: reply.status,
            message: reply.body_excerpt(BODY_EXCERPT_LEN),
        });
    }

    let parsed: GenerationsResponse = serde_json::from_slice(&reply.body)
        .map_err(|e| NodeError::MalformedResponse(format!("Failed to parse response: {e}")))?;

    let first = parsed.data.and_then(|entries| entries.into_iter().next()).ok_or_else(|| {
        NodeError::MalformedResponse(format!(
            "No images in response. Body: {}",
            reply.body_excerpt(BODY_EXCERPT_LEN)
        ))
    })?;

    let located = match format {
        ResponseFormat::Base64 => first.b64_json.map(GenerationResult::Inline),
        ResponseFormat::Url => first.url.map(GenerationResult::Url),
    };
    located.ok_or_else(|| {
        NodeError::MalformedResponse(format!(
            "First image has no '{}' field",
            format.as_str()
        ))
    })
}

// --- Together API response types ---

#[derive(Deserialize)]
struct GenerationsResponse {
    data: Option<Vec<GenerationsImage>>,
}

#[derive(Deserialize)]
struct GenerationsImage {
    b64_json: Option<String>,
    url: Option<String>,
}
