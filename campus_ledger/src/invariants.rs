//! Campus Ledger: Invariant Checks
//!
//! Two families:
//!   - state checks, which hold for any single snapshot
//!   - transition checks, which relate a snapshot to its successor
//!
//! Each check returns the first violation found.

use thiserror::Error;

use crate::domain::LedgerState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("[INVARIANT:joined_completed_disjoint] activity {0:?} is both joined and completed")]
    JoinedAndCompleted(String),

    #[error("[INVARIANT:ledger_refs] user references activity {0:?} missing from the catalog")]
    DanglingActivity(String),

    #[error("[INVARIANT:redemptions_append_only] redeemed_rewards was rewritten")]
    RedemptionsRewritten,

    #[error("[INVARIANT:reviews_append_only] reviews were rewritten")]
    ReviewsRewritten,

    #[error("[INVARIANT:completion_terminal] activity {0:?} left completed_activities")]
    CompletionReverted(String),

    #[error("[INVARIANT:registration_monotone] activity {id:?} went from {before} to {after}")]
    RegistrationDrift { id: String, before: u32, after: u32 },

    #[error("[INVARIANT:single_registration] {0} counters moved in one transition")]
    MultipleRegistrations(usize),

    #[error("[INVARIANT:catalog_immutable] activity {0:?} changed outside its counter")]
    CatalogMutated(String),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Checks that hold for any single snapshot.
pub fn validate_state(state: &LedgerState) -> Result<(), InvariantViolation> {
    check_joined_completed_disjoint(state)?;
    check_ledger_refs(state)?;
    Ok(())
}

/// Checks relating `before` to `after` across one transition.
pub fn validate_transition(
    before: &LedgerState,
    after: &LedgerState,
) -> Result<(), InvariantViolation> {
    check_redemptions_append_only(before, after)?;
    check_reviews_append_only(before, after)?;
    check_completion_terminal(before, after)?;
    check_catalog_counters(before, after)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// State checks (private)
// ---------------------------------------------------------------------------

fn check_joined_completed_disjoint(state: &LedgerState) -> Result<(), InvariantViolation> {
    let user = &state.user;
    match user
        .joined_activities
        .intersection(&user.completed_activities)
        .next()
    {
        Some(id) => Err(InvariantViolation::JoinedAndCompleted(id.clone())),
        None => Ok(()),
    }
}

/// Saved ids are deliberately not checked: ToggleSave has no preconditions.
fn check_ledger_refs(state: &LedgerState) -> Result<(), InvariantViolation> {
    let user = &state.user;
    for id in user
        .joined_activities
        .iter()
        .chain(user.completed_activities.iter())
    {
        if !state.catalog.contains(id) {
            return Err(InvariantViolation::DanglingActivity(id.clone()));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Transition checks (private)
// ---------------------------------------------------------------------------

fn check_redemptions_append_only(
    before: &LedgerState,
    after: &LedgerState,
) -> Result<(), InvariantViolation> {
    if after
        .user
        .redeemed_rewards
        .starts_with(&before.user.redeemed_rewards)
    {
        Ok(())
    } else {
        Err(InvariantViolation::RedemptionsRewritten)
    }
}

fn check_reviews_append_only(
    before: &LedgerState,
    after: &LedgerState,
) -> Result<(), InvariantViolation> {
    if after.user.reviews.starts_with(&before.user.reviews) {
        Ok(())
    } else {
        Err(InvariantViolation::ReviewsRewritten)
    }
}

fn check_completion_terminal(
    before: &LedgerState,
    after: &LedgerState,
) -> Result<(), InvariantViolation> {
    match before
        .user
        .completed_activities
        .difference(&after.user.completed_activities)
        .next()
    {
        Some(id) => Err(InvariantViolation::CompletionReverted(id.clone())),
        None => Ok(()),
    }
}

/// Counters only rise, by at most one, on at most one activity; every
/// other activity field is frozen.
fn check_catalog_counters(
    before: &LedgerState,
    after: &LedgerState,
) -> Result<(), InvariantViolation> {
    if before.catalog.len() != after.catalog.len() {
        return Err(InvariantViolation::CatalogMutated(String::from("<catalog>")));
    }

    let mut moved = 0usize;
    for (a, b) in before.catalog.iter().zip(after.catalog.iter()) {
        if a.id != b.id {
            return Err(InvariantViolation::CatalogMutated(a.id.clone()));
        }
        let delta = i64::from(b.registered_count) - i64::from(a.registered_count);
        if !(0..=1).contains(&delta) {
            return Err(InvariantViolation::RegistrationDrift {
                id: a.id.clone(),
                before: a.registered_count,
                after: b.registered_count,
            });
        }
        if delta == 1 {
            moved += 1;
        }
        let mut unbumped = b.clone();
        unbumped.registered_count = a.registered_count;
        if &unbumped != a {
            return Err(InvariantViolation::CatalogMutated(a.id.clone()));
        }
    }

    if moved > 1 {
        return Err(InvariantViolation::MultipleRegistrations(moved));
    }
    Ok(())
}
