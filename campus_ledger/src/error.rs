//! Kernel error types.
//!
//! Precondition misses (joining twice, completing something never joined,
//! redeeming without enough points) are NOT errors; they surface as
//! `TransitionResult { applied: false, .. }`. The variants below cover
//! protocol faults only: malformed envelopes, sequence gaps, bad seed data,
//! or a transition that broke an invariant.

use thiserror::Error;

use crate::invariants::InvariantViolation;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("schema version mismatch: expected {expected}, got {got}")]
    SchemaVersion { expected: u32, got: u32 },

    #[error("sequence violation: expected {expected}, got {got}")]
    Sequence { expected: u64, got: u64 },

    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
}

pub type Result<T, E = LedgerError> = std::result::Result<T, E>;
