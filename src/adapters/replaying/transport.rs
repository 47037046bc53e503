//! Replaying adapter for the `HttpTransport` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::error::NodeError;
use crate::ports::transport::{HttpReply, HttpRequest, HttpTransport, SendFuture};

/// Serves recorded HTTP replies from a cassette, never touching the network.
pub struct ReplayingTransport {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingTransport {
    /// Create a replaying transport backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl HttpTransport for ReplayingTransport {
    fn send(&self, request: &HttpRequest) -> SendFuture<'_> {
        tracing::debug!(method = ?request.method, url = %request.url, "replaying request");
        let result = next_output(&self.replayer, "transport", "send")
            .and_then(replay_result::<HttpReply>)
            .map_err(NodeError::Replay)
            .and_then(|replayed| replayed.map_err(NodeError::Replay));
        Box::pin(async move { result })
    }
}
