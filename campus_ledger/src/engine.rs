//! Campus Ledger: Engine
//!
//! Top-level orchestrator. Delegates mutation to transitions,
//! validates via invariants.
//!
//! Strict sequence enforcement: envelopes must arrive as last + 1.

use tracing::{debug, warn};

use crate::domain::{LedgerState, TransitionResult};
use crate::error::LedgerError;
use crate::events::{EventEnvelope, Intent, SCHEMA_VERSION};
use crate::invariants::{validate_state, validate_transition};
use crate::transitions::apply_intent;

/// Stateful engine wrapping the pure functional transition layer.
pub struct LedgerEngine {
    seed: LedgerState,
    state: LedgerState,
    last_sequence: u64,
}

impl LedgerEngine {
    /// Start from `seed`. The seed is kept for `reset` and `replay`.
    pub fn new(seed: LedgerState) -> Result<Self, LedgerError> {
        validate_state(&seed)?;
        Ok(Self {
            state: seed.clone(),
            seed,
            last_sequence: 0,
        })
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn seed(&self) -> &LedgerState {
        &self.seed
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    /// Drop all applied events and return to the seed.
    pub fn reset(&mut self) {
        self.state = self.seed.clone();
        self.last_sequence = 0;
    }

    /// Return to a point this engine previously reached. Used by callers
    /// that could not persist the events applied since then.
    pub fn rewind(&mut self, state: LedgerState, last_sequence: u64) {
        debug!(from = self.last_sequence, to = last_sequence, "engine rewound");
        self.state = state;
        self.last_sequence = last_sequence;
    }

    /// Apply a single envelope:
    ///   1. Validate schema version (must be 1)
    ///   2. Validate sequence (strictly increasing, no gaps)
    ///   3. Delegate to transitions::apply_intent
    ///   4. Validate state and transition invariants
    ///   5. Store and return
    ///
    /// A guarded no-op still consumes its sequence number.
    pub fn apply_event(
        &mut self,
        event: &EventEnvelope,
    ) -> Result<(&LedgerState, TransitionResult), LedgerError> {
        if event.schema_version != SCHEMA_VERSION {
            return Err(LedgerError::SchemaVersion {
                expected: SCHEMA_VERSION,
                got: event.schema_version,
            });
        }

        let expected = self.last_sequence + 1;
        if event.sequence != expected {
            return Err(LedgerError::Sequence {
                expected,
                got: event.sequence,
            });
        }

        let (new_state, result) = apply_intent(&self.state, &event.intent);

        if let Err(violation) =
            validate_state(&new_state).and_then(|()| validate_transition(&self.state, &new_state))
        {
            warn!(sequence = event.sequence, %violation, "transition rejected");
            return Err(violation.into());
        }

        debug!(
            sequence = event.sequence,
            intent = %result.intent,
            applied = result.applied,
            points = result.points_after,
            "event applied"
        );

        self.state = new_state;
        self.last_sequence = event.sequence;
        Ok((&self.state, result))
    }

    /// Wrap `intent` in the next envelope and apply it.
    pub fn submit(&mut self, intent: Intent) -> Result<(EventEnvelope, TransitionResult), LedgerError> {
        let envelope = EventEnvelope::new(self.last_sequence + 1, intent);
        let (_, result) = self.apply_event(&envelope)?;
        Ok((envelope, result))
    }

    /// Apply an ordered sequence of envelopes.
    pub fn apply_sequence(&mut self, events: &[EventEnvelope]) -> Result<&LedgerState, LedgerError> {
        for event in events {
            self.apply_event(event)?;
        }
        Ok(&self.state)
    }

    /// Event-sourced reconstruction: reset to the seed and replay.
    pub fn replay(&mut self, events: &[EventEnvelope]) -> Result<&LedgerState, LedgerError> {
        self.reset();
        self.apply_sequence(events)
    }
}
