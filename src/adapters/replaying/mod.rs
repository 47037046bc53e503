//! Replaying adapters that serve recorded interactions from cassettes.

pub mod transport;

use std::sync::{Arc, Mutex};

use crate::cassette::replayer::CassetteReplayer;

/// Retrieve the next recorded output for a given port and method.
///
/// # Errors
///
/// Returns an error if the cassette has no more interactions for the pair.
pub(crate) fn next_output(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    port: &str,
    method: &str,
) -> Result<serde_json::Value, String> {
    let mut guard = replayer.lock().map_err(|e| format!("replayer lock poisoned: {e}"))?;
    Ok(guard.next_interaction(port, method)?.output.clone())
}

/// Deserialize a replayed output as `Result<T, String>`.
///
/// The outer error covers cassettes that cannot be read as `T`.
pub(crate) fn replay_result<T: serde::de::DeserializeOwned>(
    output: serde_json::Value,
) -> Result<Result<T, String>, String> {
    if let Some(err_val) = output.get("Err").or_else(|| output.get("err")) {
        let msg = err_val.as_str().unwrap_or("replayed error").to_string();
        return Ok(Err(msg));
    }
    let ok_val = output.get("Ok").or_else(|| output.get("ok")).cloned().unwrap_or(output);
    serde_json::from_value(ok_val).map(Ok).map_err(|e| format!("Malformed cassette output: {e}"))
}
