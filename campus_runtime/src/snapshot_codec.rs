//! Snapshot codec: `LedgerState` ↔ JSON.
//!
//! Pure codec layer plus thin file helpers. No timestamps, no envelope.
//!
//! - `encode_snapshot`:  state → compact JSON
//! - `decode_snapshot`:  JSON → state (strict, unknown fields rejected)
//! - `restore_snapshot`: decode + state invariants
//! - `export_snapshot_to_file` / `import_snapshot_from_file`
//! - `snapshot_hash`:    SHA-256 of the encoded JSON

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use campus_ledger::domain::LedgerState;
use campus_ledger::hashing::hex_digest;
use campus_ledger::invariants::{validate_state, InvariantViolation};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot serialization failed: {0}")]
    Serialization(String),

    #[error("snapshot is malformed: {0}")]
    Deserialization(String),

    #[error("snapshot violates ledger invariants: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("snapshot hash mismatch: recorded {recorded}, computed {computed}")]
    HashMismatch { recorded: String, computed: String },

    #[error("snapshot io: {0}")]
    Io(#[from] io::Error),
}

pub fn encode_snapshot(state: &LedgerState) -> Result<String, SnapshotError> {
    serde_json::to_string(state).map_err(|e| SnapshotError::Serialization(e.to_string()))
}

/// Strict decode. No invariant checks; use `restore_snapshot` for
/// anything that did not come from this process.
pub fn decode_snapshot(json: &str) -> Result<LedgerState, SnapshotError> {
    serde_json::from_str::<LedgerState>(json)
        .map_err(|e| SnapshotError::Deserialization(e.to_string()))
}

pub fn restore_snapshot(json: &str) -> Result<LedgerState, SnapshotError> {
    let state = decode_snapshot(json)?;
    validate_state(&state)?;
    Ok(state)
}

pub fn export_snapshot_to_file(state: &LedgerState, path: &Path) -> Result<(), SnapshotError> {
    let json = encode_snapshot(state)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json.as_bytes())?;
    Ok(())
}

pub fn import_snapshot_from_file(path: &Path) -> Result<LedgerState, SnapshotError> {
    let content = fs::read_to_string(path)?;
    restore_snapshot(&content)
}

/// Integrity hash of the encoded form. This is not the canonical ledger
/// hash: field layout follows serde, not `hashing`.
pub fn snapshot_hash(state: &LedgerState) -> Result<String, SnapshotError> {
    Ok(hex_digest(encode_snapshot(state)?.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_ledger::seed::seeded_state;
    use campus_ledger::transitions::{complete, join};

    #[test]
    fn encode_decode_preserves_state() {
        let (s1, _) = join(&seeded_state(), "A2");
        let (s2, _) = complete(&s1, "A2");
        let json = encode_snapshot(&s2).unwrap();
        assert_eq!(restore_snapshot(&json).unwrap(), s2);
    }

    #[test]
    fn encoding_is_byte_stable() {
        let state = seeded_state();
        assert_eq!(encode_snapshot(&state).unwrap(), encode_snapshot(&state.clone()).unwrap());
        assert_eq!(snapshot_hash(&state).unwrap().len(), 64);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let mut v: serde_json::Value =
            serde_json::from_str(&encode_snapshot(&seeded_state()).unwrap()).unwrap();
        v["user"]["vip"] = serde_json::json!(true);
        assert!(matches!(
            decode_snapshot(&v.to_string()),
            Err(SnapshotError::Deserialization(_))
        ));
    }

    #[test]
    fn duplicate_catalog_ids_are_rejected() {
        let mut v: serde_json::Value =
            serde_json::from_str(&encode_snapshot(&seeded_state()).unwrap()).unwrap();
        let first = v["catalog"][0].clone();
        v["catalog"].as_array_mut().unwrap().push(first);
        assert!(decode_snapshot(&v.to_string()).is_err());
    }

    #[test]
    fn restore_runs_invariants() {
        let mut state = seeded_state();
        state.user.joined_activities.insert("A1".into());
        state.user.completed_activities.insert("A1".into());
        let json = encode_snapshot(&state).unwrap();
        assert!(decode_snapshot(&json).is_ok());
        assert!(matches!(
            restore_snapshot(&json),
            Err(SnapshotError::Invariant(InvariantViolation::JoinedAndCompleted(_)))
        ));
    }
}
