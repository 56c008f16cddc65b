//! Rebuild ledger state from a journal.
//!
//! All domain logic stays in the kernel; this only feeds it envelopes.

use campus_ledger::domain::LedgerState;
use campus_ledger::engine::LedgerEngine;
use campus_ledger::error::LedgerError;
use campus_ledger::events::EventEnvelope;
use campus_ledger::hashing::canonical_hash;

/// Replay `events` on top of `seed`, returning the final state and its
/// canonical hash.
pub fn rebuild_state(
    seed: &LedgerState,
    events: &[EventEnvelope],
) -> Result<(LedgerState, String), LedgerError> {
    let mut engine = LedgerEngine::new(seed.clone())?;
    let state = engine.apply_sequence(events)?.clone();
    let hash = canonical_hash(&state);
    Ok((state, hash))
}

pub fn rebuild_hash(seed: &LedgerState, events: &[EventEnvelope]) -> Result<String, LedgerError> {
    rebuild_state(seed, events).map(|(_, hash)| hash)
}
