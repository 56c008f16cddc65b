//! Proto ↔ kernel conversion.
//!
//! `kernel_to_proto` is total. `proto_to_kernel` rejects frames with a
//! missing intent or review, and ratings that do not fit a `u8`.

use campus_ledger::domain::Review;
use campus_ledger::error::LedgerError;
use campus_ledger::events::{EventEnvelope, Intent};

use crate::proto_types::*;

/// Convert a journal frame back into the kernel's envelope.
///
/// Schema version is carried through untouched; the engine decides
/// whether it is acceptable.
pub fn proto_to_kernel(proto: &ProtoEventEnvelope) -> Result<EventEnvelope, LedgerError> {
    let kind = proto
        .intent
        .as_ref()
        .and_then(|i| i.kind.as_ref())
        .ok_or_else(|| malformed(proto.sequence, "frame has no intent"))?;

    let intent = match kind {
        IntentKind::Join(j) => Intent::join(j.activity_id.clone()),
        IntentKind::Complete(c) => Intent::complete(c.activity_id.clone()),
        IntentKind::RedeemReward(r) => Intent::redeem(r.reward_id.clone(), r.cost),
        IntentKind::ToggleSave(t) => Intent::toggle_save(t.activity_id.clone()),
        IntentKind::SubmitReview(s) => {
            let r = s
                .review
                .as_ref()
                .ok_or_else(|| malformed(proto.sequence, "submit_review without review"))?;
            let rating = u8::try_from(r.rating)
                .map_err(|_| malformed(proto.sequence, "rating out of range"))?;
            Intent::SubmitReview {
                review: Review {
                    id: r.id.clone(),
                    activity_id: r.activity_id.clone(),
                    activity_title: r.activity_title.clone(),
                    rating,
                    content: r.content.clone(),
                    timestamp: r.timestamp.clone(),
                },
            }
        }
    };

    Ok(EventEnvelope {
        sequence: proto.sequence,
        logical_time: proto.logical_time,
        schema_version: proto.schema_version,
        intent,
    })
}

/// Convert a kernel envelope into a journal frame.
pub fn kernel_to_proto(kernel: &EventEnvelope) -> ProtoEventEnvelope {
    let kind = match &kernel.intent {
        Intent::Join { activity_id } => IntentKind::Join(Join {
            activity_id: activity_id.clone(),
        }),
        Intent::Complete { activity_id } => IntentKind::Complete(Complete {
            activity_id: activity_id.clone(),
        }),
        Intent::RedeemReward { reward_id, cost } => IntentKind::RedeemReward(RedeemReward {
            reward_id: reward_id.clone(),
            cost: *cost,
        }),
        Intent::ToggleSave { activity_id } => IntentKind::ToggleSave(ToggleSave {
            activity_id: activity_id.clone(),
        }),
        Intent::SubmitReview { review } => IntentKind::SubmitReview(SubmitReview {
            review: Some(ProtoReview {
                id: review.id.clone(),
                activity_id: review.activity_id.clone(),
                activity_title: review.activity_title.clone(),
                rating: u32::from(review.rating),
                content: review.content.clone(),
                timestamp: review.timestamp.clone(),
            }),
        }),
    };

    ProtoEventEnvelope {
        sequence: kernel.sequence,
        logical_time: kernel.logical_time,
        schema_version: kernel.schema_version,
        intent: Some(ProtoIntent { kind: Some(kind) }),
    }
}

fn malformed(sequence: u64, what: &str) -> LedgerError {
    LedgerError::MalformedEvent(format!("sequence {}: {}", sequence, what))
}
