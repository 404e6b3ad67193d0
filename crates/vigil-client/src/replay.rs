//! Re-delivery of stored failed events.

use anyhow::Result;

use crate::{DeliveryClient, FailureStore};

/// Replays every stored entry sequentially with the client's normal
/// retry/backoff policy.
///
/// Entries that deliver are removed; entries that fail, are malformed, or
/// carry an unrecognized route prefix stay in place for a future pass. A
/// single failing entry never aborts the batch. Returns the number of
/// entries replayed.
pub async fn replay_all(client: &DeliveryClient, store: &FailureStore) -> Result<usize> {
    let mut replayed = 0;
    for entry in store.list_all()? {
        let name = entry
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let Some(route) = entry.route else {
            tracing::warn!(file = %name, "unrecognized route prefix, skipping");
            continue;
        };

        let bytes = match std::fs::read(&entry.path) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(file = %name, error = %e, "unreadable entry, skipping");
                continue;
            }
        };

        // Syntactic check only; the schema is not re-validated.
        let payload: serde_json::Value = match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(file = %name, error = %e, "invalid payload, skipping");
                continue;
            }
        };

        match client.send(route, &payload).await {
            Ok(_) => {
                if let Err(e) = store.remove(&entry.path) {
                    tracing::warn!(file = %name, error = %e, "delivered but could not remove, will replay again");
                }
                replayed += 1;
                tracing::info!(file = %name, "replayed");
            }
            Err(e) => {
                tracing::warn!(file = %name, error = %e, "replay failed, leaving for next pass");
            }
        }
    }
    Ok(replayed)
}
