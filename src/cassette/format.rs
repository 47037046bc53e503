//! On-disk cassette layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded session: every exchange that crossed a port, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Human readable session name.
    pub name: String,
    /// When the recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Source revision the recording was made from.
    pub commit: String,
    /// Recorded exchanges.
    pub interactions: Vec<Interaction>,
}

/// One call through a port and what it returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Position in the recording, starting at zero.
    pub seq: u64,
    /// Port name, e.g. `transport`.
    pub port: String,
    /// Method name, e.g. `send`.
    pub method: String,
    /// Serialized call arguments.
    pub input: serde_json::Value,
    /// Serialized result, `{"Ok": ..}` or `{"Err": ".."}`.
    pub output: serde_json::Value,
}
