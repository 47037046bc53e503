//! Live HTTP transport backed by `reqwest`.

use std::time::Duration;

use reqwest::Client;

use crate::error::NodeError;
use crate::ports::transport::{HttpReply, HttpRequest, HttpTransport, Method, SendFuture};

/// Sends requests over the network with a shared `reqwest` client.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport, optionally bounding each request by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(timeout: Option<Duration>) -> Result<Self, NodeError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self { client: builder.build()? })
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> SendFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let mut builder = match request.method {
                Method::Get => self.client.get(&request.url),
                Method::Post => self.client.post(&request.url),
            };
            if let Some(ref key) = request.bearer {
                builder = builder.bearer_auth(key);
            }
            if let Some(ref body) = request.body {
                builder = builder.json(body);
            }

            tracing::debug!(method = ?request.method, url = %request.url, "sending request");
            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?.to_vec();
            tracing::debug!(status, bytes = body.len(), "received reply");

            Ok(HttpReply { status, body })
        })
    }
}
