//! Drift detection: determinism checks and structured state diffs.

use std::collections::BTreeSet;

use thiserror::Error;

use campus_ledger::domain::LedgerState;
use campus_ledger::error::LedgerError;
use campus_ledger::events::EventEnvelope;

use crate::replay;

#[derive(Debug, Error)]
pub enum DriftError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("determinism failure: replays produced {first} and {second}")]
    Diverged { first: String, second: String },
}

/// Replay `events` twice from `seed` and require identical hashes.
/// Returns the agreed hash.
pub fn verify_determinism(seed: &LedgerState, events: &[EventEnvelope]) -> Result<String, DriftError> {
    let first = replay::rebuild_hash(seed, events)?;
    let second = replay::rebuild_hash(seed, events)?;
    if first != second {
        return Err(DriftError::Diverged { first, second });
    }
    Ok(first)
}

/// What changed between two ledger states of the same user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerDiff {
    pub points_a: u64,
    pub points_b: u64,
    pub points_delta: i128,
    pub joined_added: Vec<String>,
    pub joined_removed: Vec<String>,
    pub completed_added: Vec<String>,
    pub saved_added: Vec<String>,
    pub saved_removed: Vec<String>,
    /// Redemptions present in `b` past the common prefix with `a`.
    pub new_redemptions: Vec<String>,
    pub new_reviews: usize,
    /// (activity id, b - a) for every counter that moved, catalog order.
    pub registration_deltas: Vec<(String, i64)>,
}

impl LedgerDiff {
    pub fn is_empty(&self) -> bool {
        self.points_delta == 0
            && self.joined_added.is_empty()
            && self.joined_removed.is_empty()
            && self.completed_added.is_empty()
            && self.saved_added.is_empty()
            && self.saved_removed.is_empty()
            && self.new_redemptions.is_empty()
            && self.new_reviews == 0
            && self.registration_deltas.is_empty()
    }
}

pub fn compare_states(a: &LedgerState, b: &LedgerState) -> LedgerDiff {
    let (ua, ub) = (&a.user, &b.user);

    let common = ua
        .redeemed_rewards
        .iter()
        .zip(ub.redeemed_rewards.iter())
        .take_while(|(x, y)| x == y)
        .count();

    let registration_deltas = b
        .catalog
        .iter()
        .filter_map(|act| {
            let before = a.catalog.get(&act.id).map_or(0, |x| i64::from(x.registered_count));
            let delta = i64::from(act.registered_count) - before;
            (delta != 0).then(|| (act.id.clone(), delta))
        })
        .collect();

    LedgerDiff {
        points_a: ua.points,
        points_b: ub.points,
        points_delta: i128::from(ub.points) - i128::from(ua.points),
        joined_added: added(&ua.joined_activities, &ub.joined_activities),
        joined_removed: added(&ub.joined_activities, &ua.joined_activities),
        completed_added: added(&ua.completed_activities, &ub.completed_activities),
        saved_added: added(&ua.saved_activities, &ub.saved_activities),
        saved_removed: added(&ub.saved_activities, &ua.saved_activities),
        new_redemptions: ub.redeemed_rewards[common..].to_vec(),
        new_reviews: ub.reviews.len().saturating_sub(ua.reviews.len()),
        registration_deltas,
    }
}

fn added(from: &BTreeSet<String>, to: &BTreeSet<String>) -> Vec<String> {
    to.difference(from).cloned().collect()
}
