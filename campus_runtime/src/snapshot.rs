//! Periodic session snapshots.
//!
//! One file per checkpoint, `snapshot_NNNNNN.json`, holding the codec
//! encoding of the state and its canonical ledger hash. No timestamps.
//! A snapshot whose hash does not match its state is never trusted.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use campus_ledger::domain::LedgerState;
use campus_ledger::hashing::canonical_hash;
use campus_ledger::LEDGER_VERSION;

use crate::snapshot_codec::{encode_snapshot, restore_snapshot, SnapshotError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Last journal sequence folded into `state`.
    pub sequence: u64,
    pub ledger_version: u32,
    /// Canonical ledger hash of `state`.
    pub hash: String,
    /// `snapshot_codec` encoding.
    pub state: String,
}

fn file_name(sequence: u64) -> String {
    format!("snapshot_{:06}.json", sequence)
}

pub fn save_snapshot(
    dir: &Path,
    sequence: u64,
    state: &LedgerState,
) -> Result<PathBuf, SnapshotError> {
    fs::create_dir_all(dir)?;

    let snap = Snapshot {
        sequence,
        ledger_version: LEDGER_VERSION,
        hash: canonical_hash(state),
        state: encode_snapshot(state)?,
    };
    let content =
        serde_json::to_string(&snap).map_err(|e| SnapshotError::Serialization(e.to_string()))?;

    let path = dir.join(file_name(sequence));
    let mut file = File::create(&path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    Ok(path)
}

pub fn load_snapshot(dir: &Path, sequence: u64) -> Result<Option<Snapshot>, SnapshotError> {
    let path = dir.join(file_name(sequence));
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| SnapshotError::Deserialization(e.to_string()))
}

/// Highest-sequence snapshot in `dir`, if any.
pub fn load_latest_snapshot(dir: &Path) -> Result<Option<Snapshot>, SnapshotError> {
    if !dir.exists() {
        return Ok(None);
    }

    let mut best: Option<u64> = None;
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        let seq = name
            .to_str()
            .and_then(|n| n.strip_prefix("snapshot_"))
            .and_then(|n| n.strip_suffix(".json"))
            .and_then(|n| n.parse::<u64>().ok());
        if let Some(seq) = seq {
            best = Some(best.map_or(seq, |b| b.max(seq)));
        }
    }

    match best {
        Some(seq) => load_snapshot(dir, seq),
        None => Ok(None),
    }
}

/// Decode the embedded state and check it against the recorded hash.
pub fn verify_snapshot(snap: &Snapshot) -> Result<LedgerState, SnapshotError> {
    let state = restore_snapshot(&snap.state)?;
    let computed = canonical_hash(&state);
    if computed != snap.hash {
        return Err(SnapshotError::HashMismatch {
            recorded: snap.hash.clone(),
            computed,
        });
    }
    Ok(state)
}
