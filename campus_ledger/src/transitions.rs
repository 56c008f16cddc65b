//! Campus Ledger: Centralized Transition Logic
//!
//! ALL ledger mutation lives here.
//! Every transition takes the current state and returns a new one; the
//! input is never mutated. A guarded no-op returns an exact clone of the
//! input so callers can compare hashes byte for byte.

use tracing::debug;

use crate::arithmetic::{credit_points, debit_points};
use crate::domain::{LedgerState, NoOpReason, Review, TransitionResult};
use crate::events::Intent;

/// Outcome of a handler: `Ok(registered_count)` when applied.
type Outcome = Result<Option<u32>, NoOpReason>;

// ---------------------------------------------------------------------------
// Public dispatcher
// ---------------------------------------------------------------------------

/// Apply `intent` to `state` and return `(new_state, result)`.
pub fn apply_intent(state: &LedgerState, intent: &Intent) -> (LedgerState, TransitionResult) {
    let mut new_state = state.clone();

    let outcome = match intent {
        Intent::Join { activity_id } => apply_join(&mut new_state, activity_id),
        Intent::Complete { activity_id } => apply_complete(&mut new_state, activity_id),
        Intent::RedeemReward { reward_id, cost } => {
            apply_redeem_reward(&mut new_state, reward_id, *cost)
        }
        Intent::ToggleSave { activity_id } => apply_toggle_save(&mut new_state, activity_id),
        Intent::SubmitReview { review } => apply_submit_review(&mut new_state, review),
    };

    let points_before = state.user.points;
    match outcome {
        Ok(registered_count) => {
            debug!(intent = %intent.kind(), "transition applied");
            let points_after = new_state.user.points;
            (
                new_state,
                TransitionResult {
                    intent: intent.kind(),
                    applied: true,
                    reason: None,
                    points_before,
                    points_after,
                    registered_count,
                },
            )
        }
        Err(reason) => {
            debug!(intent = %intent.kind(), %reason, "transition skipped");
            (
                state.clone(),
                TransitionResult {
                    intent: intent.kind(),
                    applied: false,
                    reason: Some(reason),
                    points_before,
                    points_after: points_before,
                    registered_count: None,
                },
            )
        }
    }
}

/// Join: idempotent; bumps the activity's registration counter exactly once.
pub fn join(state: &LedgerState, activity_id: &str) -> (LedgerState, TransitionResult) {
    apply_intent(state, &Intent::join(activity_id))
}

/// Complete: joined → completed, +`completion_points`.
pub fn complete(state: &LedgerState, activity_id: &str) -> (LedgerState, TransitionResult) {
    apply_intent(state, &Intent::complete(activity_id))
}

/// RedeemReward: declines silently when the balance is short.
pub fn redeem_reward(
    state: &LedgerState,
    reward_id: &str,
    cost: u64,
) -> (LedgerState, TransitionResult) {
    apply_intent(state, &Intent::redeem(reward_id, cost))
}

pub fn toggle_save(state: &LedgerState, activity_id: &str) -> (LedgerState, TransitionResult) {
    apply_intent(state, &Intent::toggle_save(activity_id))
}

pub fn submit_review(state: &LedgerState, review: Review) -> (LedgerState, TransitionResult) {
    apply_intent(state, &Intent::SubmitReview { review })
}

// ---------------------------------------------------------------------------
// Individual handlers (private)
// ---------------------------------------------------------------------------

fn apply_join(state: &mut LedgerState, activity_id: &str) -> Outcome {
    if !state.catalog.contains(activity_id) {
        return Err(NoOpReason::UnknownActivity);
    }
    // Completed is terminal; re-joining would break joined/completed disjointness.
    if state.user.has_completed(activity_id) {
        return Err(NoOpReason::AlreadyCompleted);
    }
    if state.user.has_joined(activity_id) {
        return Err(NoOpReason::AlreadyJoined);
    }

    let count = state
        .catalog
        .increment_registration(activity_id)
        .ok_or(NoOpReason::CounterOverflow)?;
    state.user.joined_activities.insert(activity_id.to_string());

    Ok(Some(count))
}

fn apply_complete(state: &mut LedgerState, activity_id: &str) -> Outcome {
    if !state.user.has_joined(activity_id) {
        return Err(NoOpReason::NotJoined);
    }

    let points = credit_points(state.user.points, state.constants.completion_points)
        .ok_or(NoOpReason::PointsOverflow)?;

    state.user.joined_activities.remove(activity_id);
    state.user.completed_activities.insert(activity_id.to_string());
    state.user.points = points;

    Ok(None)
}

fn apply_redeem_reward(state: &mut LedgerState, reward_id: &str, cost: u64) -> Outcome {
    let balance = state.user.points;
    let points = debit_points(balance, cost)
        .ok_or(NoOpReason::InsufficientPoints { balance, cost })?;

    state.user.points = points;
    state.user.redeemed_rewards.push(reward_id.to_string());

    Ok(None)
}

fn apply_toggle_save(state: &mut LedgerState, activity_id: &str) -> Outcome {
    let saved = &mut state.user.saved_activities;
    if !saved.remove(activity_id) {
        saved.insert(activity_id.to_string());
    }
    Ok(None)
}

fn apply_submit_review(state: &mut LedgerState, review: &Review) -> Outcome {
    if !(1..=5).contains(&review.rating) {
        return Err(NoOpReason::InvalidRating {
            rating: review.rating,
        });
    }
    if review.content.trim().is_empty() {
        return Err(NoOpReason::EmptyReview);
    }

    state.user.reviews.push(review.clone());
    Ok(None)
}
