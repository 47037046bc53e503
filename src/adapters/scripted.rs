//! In-memory transport that answers from a script, for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::NodeError;
use crate::ports::transport::{HttpReply, HttpRequest, HttpTransport, SendFuture};

/// Serves pre-canned replies in order and remembers every request.
///
/// An `Err` entry simulates a transport failure such as a refused connection.
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<HttpReply, String>>>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    /// Serve `replies` front to back.
    pub fn new(replies: Vec<Result<HttpReply, String>>) -> Self {
        Self { replies: Mutex::new(replies.into()), sent: Mutex::new(Vec::new()) }
    }

    /// Every request sent so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl HttpTransport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> SendFuture<'_> {
        self.sent.lock().unwrap().push(request.clone());
        let next = self.replies.lock().unwrap().pop_front();
        Box::pin(async move {
            match next {
                Some(Ok(reply)) => Ok(reply),
                Some(Err(message)) => Err(NodeError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    message,
                ))),
                None => Err(NodeError::Replay("script exhausted".into())),
            }
        })
    }
}
