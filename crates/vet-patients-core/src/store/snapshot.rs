//! Snapshot encoding for the persisted store state.
//!
//! The blob is a small JSON envelope around the serialized state:
//!
//! ```json
//! { "version": 1, "checksum": "<sha256 hex of state>", "state": "<state json>" }
//! ```
//!
//! The state is kept as an embedded string so the checksum covers the exact
//! bytes that were written.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::PatientState;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Reasons a stored snapshot cannot be used.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unsupported snapshot version: {found}")]
    UnsupportedVersion { found: u32 },

    #[error("Snapshot checksum mismatch")]
    ChecksumMismatch,

    #[error("Snapshot contains duplicate patient ids")]
    DuplicateIds,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    checksum: String,
    state: String,
}

/// Serialize `state` into a snapshot blob.
pub fn encode(state: &PatientState) -> Result<Vec<u8>, serde_json::Error> {
    let payload = serde_json::to_string(state)?;
    let envelope = Envelope {
        version: SNAPSHOT_VERSION,
        checksum: checksum(payload.as_bytes()),
        state: payload,
    };
    serde_json::to_vec(&envelope)
}

/// Parse and verify a snapshot blob.
pub fn decode(bytes: &[u8]) -> Result<PatientState, SnapshotError> {
    let envelope: Envelope = serde_json::from_slice(bytes)?;

    if envelope.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: envelope.version,
        });
    }

    if checksum(envelope.state.as_bytes()) != envelope.checksum {
        return Err(SnapshotError::ChecksumMismatch);
    }

    let state: PatientState = serde_json::from_str(&envelope.state)?;
    if !state.has_unique_ids() {
        return Err(SnapshotError::DuplicateIds);
    }

    Ok(state)
}

fn checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
