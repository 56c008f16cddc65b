#![forbid(unsafe_code)]

//! Engagement & rewards ledger for campus activities.
//!
//! Pure and deterministic: no I/O, no clocks. Every mutation is a
//! transition from one `LedgerState` to the next.

/// Ledger v1. Bumped only when canonical hashing changes.
pub const LEDGER_VERSION: u32 = 1;

pub mod arithmetic;
pub mod catalog;
pub mod domain;
pub mod engine;
pub mod error;
pub mod events;
pub mod hashing;
pub mod invariants;
pub mod seed;
pub mod state;
pub mod transitions;

pub use domain::{LedgerState, NoOpReason, TransitionResult};
pub use engine::LedgerEngine;
pub use error::LedgerError;
pub use events::{EventEnvelope, Intent, IntentKind};
