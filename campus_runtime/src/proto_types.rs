//! Hand-written protobuf types for the ledger journal.
//!
//! Uses prost derive macros for encode/decode without prost-build.
//! Tags are part of the on-disk format: never renumber.

use prost::Message;

// ── Event Envelope ─────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct ProtoEventEnvelope {
    #[prost(uint64, tag = "1")]
    pub sequence: u64,
    #[prost(uint64, tag = "2")]
    pub logical_time: u64,
    #[prost(uint32, tag = "3")]
    pub schema_version: u32,
    #[prost(message, optional, tag = "4")]
    pub intent: Option<ProtoIntent>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoIntent {
    #[prost(oneof = "IntentKind", tags = "1, 2, 3, 4, 5")]
    pub kind: Option<IntentKind>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum IntentKind {
    #[prost(message, tag = "1")]
    Join(Join),
    #[prost(message, tag = "2")]
    Complete(Complete),
    #[prost(message, tag = "3")]
    RedeemReward(RedeemReward),
    #[prost(message, tag = "4")]
    ToggleSave(ToggleSave),
    #[prost(message, tag = "5")]
    SubmitReview(SubmitReview),
}

// ── Review ─────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct ProtoReview {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub activity_id: String,
    #[prost(string, tag = "3")]
    pub activity_title: String,
    #[prost(uint32, tag = "4")]
    pub rating: u32,
    #[prost(string, tag = "5")]
    pub content: String,
    #[prost(string, tag = "6")]
    pub timestamp: String,
}

// ── Intent Types ───────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct Join {
    #[prost(string, tag = "1")]
    pub activity_id: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct Complete {
    #[prost(string, tag = "1")]
    pub activity_id: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct RedeemReward {
    #[prost(string, tag = "1")]
    pub reward_id: String,
    #[prost(uint64, tag = "2")]
    pub cost: u64,
}

#[derive(Clone, PartialEq, Message)]
pub struct ToggleSave {
    #[prost(string, tag = "1")]
    pub activity_id: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct SubmitReview {
    #[prost(message, optional, tag = "1")]
    pub review: Option<ProtoReview>,
}
