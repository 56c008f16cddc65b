use std::io;

use thiserror::Error;

use campus_ledger::error::LedgerError;

use crate::snapshot_codec::SnapshotError;

/// Failures surfaced by a session. Guarded no-ops are not errors; they
/// come back as a `TransitionResult` with `applied == false`.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("ledger rejected event: {0}")]
    Ledger(#[from] LedgerError),

    #[error("journal io: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
