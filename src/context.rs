//! Service context: wires a transport, the credential, and API settings into
//! an [`ImageRequestAdapter`].

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::http::ReqwestTransport;
use crate::adapters::recording::transport::RecordingTransport;
use crate::adapters::replaying::transport::ReplayingTransport;
use crate::cassette::config::load_cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::config::Config;
use crate::error::NodeError;
use crate::generator::ImageRequestAdapter;
use crate::ports::HttpTransport;

/// Credential used when replaying; cassettes never hold the real key.
const REPLAY_API_KEY: &str = "replayed";

/// Bundles the composed adapter.
pub struct ServiceContext {
    /// The node operation, ready to run.
    pub adapter: ImageRequestAdapter,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Finish the recording and write the cassette file to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(self, ctx: ServiceContext) -> Result<PathBuf, String> {
        // The adapter holds the other reference to the recorder.
        drop(ctx);
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| "Recording transport still has references".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        tracing::debug!(interactions = recorder.interaction_count(), "finishing recording");
        recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

impl ServiceContext {
    /// Create a live context that talks to the real API.
    ///
    /// A missing key is not an error here; the adapter falls back at call time.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn live(config: &Config) -> Result<Self, NodeError> {
        let transport = Arc::new(ReqwestTransport::new(config.api.timeout())?);
        Ok(Self::with_transport(transport, config.together_key(), config))
    }

    /// Create a recording context that wraps the live transport with a recorder.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn recording(config: &Config) -> Result<(Self, RecordingSession), NodeError> {
        let live = Arc::new(ReqwestTransport::new(config.api.timeout())?);

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = PathBuf::from(".together-node/cassettes")
            .join(&timestamp)
            .join("transport.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-transport"),
            get_commit_hash(),
        )));

        let transport = Arc::new(RecordingTransport::new(live, Arc::clone(&recorder)));
        let ctx = Self::with_transport(transport, config.together_key(), config);
        Ok((ctx, RecordingSession { recorder }))
    }

    /// Create a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path, config: &Config) -> Result<Self, NodeError> {
        let replayer = load_cassette(path)
            .map_err(|e| NodeError::Config(format!("Failed to load cassette: {e}")))?;
        let transport = Arc::new(ReplayingTransport::new(Arc::new(Mutex::new(replayer))));
        Ok(Self::with_transport(transport, Some(REPLAY_API_KEY.to_string()), config))
    }

    fn with_transport(
        transport: Arc<dyn HttpTransport>,
        api_key: Option<String>,
        config: &Config,
    ) -> Self {
        if api_key.is_none() {
            tracing::warn!("no Together AI key configured, every image will be the fallback");
        }
        Self { adapter: ImageRequestAdapter::new(transport, api_key, config.api.clone()) }
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
