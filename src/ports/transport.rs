//! HTTP transport port: the only way the node talks to the network.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::NodeError;

/// HTTP verb of an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Fetch a resource.
    Get,
    /// Submit a JSON body.
    Post,
}

/// An outbound HTTP request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Bearer token sent in the `Authorization` header. Never serialized.
    #[serde(skip_serializing, default)]
    pub bearer: Option<String>,
    /// JSON body, for POST requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    /// A GET request without credentials.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: Method::Get, url: url.into(), bearer: None, body: None }
    }

    /// An authenticated POST with a JSON body.
    #[must_use]
    pub fn post_json(url: impl Into<String>, bearer: &str, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            bearer: Some(bearer.to_string()),
            body: Some(body),
        }
    }
}

/// The status and raw body of a completed exchange.
///
/// Non-success statuses are replies, not errors; callers decide what they mean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpReply {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    #[serde(with = "base64_bytes")]
    pub body: Vec<u8>,
}

impl HttpReply {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body as text, lossily decoded and cut to `max` bytes for logs.
    #[must_use]
    pub fn body_excerpt(&self, max: usize) -> String {
        let text = String::from_utf8_lossy(&self.body);
        if text.len() <= max {
            return text.into_owned();
        }
        let mut end = max;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}

/// Boxed future type returned by [`HttpTransport::send`].
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpReply, NodeError>> + Send + 'a>>;

/// Performs HTTP exchanges.
pub trait HttpTransport: Send + Sync {
    /// Send one request and return whatever the server answered.
    ///
    /// Only transport failures are errors.
    fn send(&self, request: &HttpRequest) -> SendFuture<'_>;
}

/// Serde helper for serializing `Vec<u8>` as base64 strings in cassettes.
mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as base64 string.
    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        serializer.serialize_str(&encoded)
    }

    /// Deserialize base64 string to bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
