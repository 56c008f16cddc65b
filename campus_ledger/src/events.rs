//! Campus Ledger: Intent and Envelope Definitions
//!
//! Intents are pure data. They carry what the user asked for and nothing
//! else; all transition logic lives in `transitions`.
//!
//! Schema version is locked at 1. Envelopes with any other
//! schema_version are rejected by the engine.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Review;
use crate::error::LedgerError;

/// Schema version for v1 envelopes.
pub const SCHEMA_VERSION: u32 = 1;

/// A state-mutating request against the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "payload", rename_all = "snake_case")]
pub enum Intent {
    Join { activity_id: String },
    Complete { activity_id: String },
    RedeemReward { reward_id: String, cost: u64 },
    ToggleSave { activity_id: String },
    SubmitReview { review: Review },
}

impl Intent {
    pub fn join(activity_id: impl Into<String>) -> Self {
        Intent::Join { activity_id: activity_id.into() }
    }

    pub fn complete(activity_id: impl Into<String>) -> Self {
        Intent::Complete { activity_id: activity_id.into() }
    }

    pub fn redeem(reward_id: impl Into<String>, cost: u64) -> Self {
        Intent::RedeemReward { reward_id: reward_id.into(), cost }
    }

    pub fn toggle_save(activity_id: impl Into<String>) -> Self {
        Intent::ToggleSave { activity_id: activity_id.into() }
    }

    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::Join { .. } => IntentKind::Join,
            Intent::Complete { .. } => IntentKind::Complete,
            Intent::RedeemReward { .. } => IntentKind::RedeemReward,
            Intent::ToggleSave { .. } => IntentKind::ToggleSave,
            Intent::SubmitReview { .. } => IntentKind::SubmitReview,
        }
    }
}

/// Discriminant of an `Intent`, used in results and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Join,
    Complete,
    RedeemReward,
    ToggleSave,
    SubmitReview,
}

impl IntentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::Join => "join",
            IntentKind::Complete => "complete",
            IntentKind::RedeemReward => "redeem_reward",
            IntentKind::ToggleSave => "toggle_save",
            IntentKind::SubmitReview => "submit_review",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Sequenced wrapper around an intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub sequence: u64,
    pub logical_time: u64,
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub intent: Intent,
}

impl EventEnvelope {
    /// v1 envelope. Logical time tracks the sequence.
    pub fn new(sequence: u64, intent: Intent) -> Self {
        Self {
            sequence,
            logical_time: sequence,
            schema_version: SCHEMA_VERSION,
            intent,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "sequence": self.sequence,
            "logical_time": self.logical_time,
            "schema_version": self.schema_version,
            "intent": self.intent,
        })
    }

    /// Parse an envelope from JSON (fixtures, exported journals).
    pub fn from_value(v: &Value) -> Result<Self, LedgerError> {
        serde_json::from_value(v.clone()).map_err(|e| LedgerError::MalformedEvent(e.to_string()))
    }
}
