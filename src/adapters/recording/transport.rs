//! Recording adapter for the `HttpTransport` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::transport::{HttpRequest, HttpTransport, SendFuture};

/// Records every exchange while delegating to an inner transport.
pub struct RecordingTransport {
    inner: Arc<dyn HttpTransport>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingTransport {
    /// Creates a recording transport wrapping the given implementation.
    pub fn new(inner: Arc<dyn HttpTransport>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl HttpTransport for RecordingTransport {
    fn send(&self, request: &HttpRequest) -> SendFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let result = self.inner.send(&request).await;
            record_result(&self.recorder, "transport", "send", &request, &result);
            result
        })
    }
}
