//! Campus Ledger: State Construction

use crate::catalog::Catalog;
use crate::domain::{Activity, LedgerConstants, LedgerState, Reward, User};
use crate::error::LedgerError;
use crate::invariants::validate_state;

/// Build a session state from caller-supplied data.
///
/// The catalog is validated (id format, uniqueness) and the user's
/// joined/completed sets must reference catalog entries.
pub fn create_initial_state(
    user: User,
    activities: Vec<Activity>,
    rewards: Vec<Reward>,
    constants: Option<LedgerConstants>,
) -> Result<LedgerState, LedgerError> {
    let state = LedgerState {
        user,
        catalog: Catalog::new(activities)?,
        rewards,
        constants: constants.unwrap_or_default(),
    };
    validate_state(&state)?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::seed::{seed_activities, seed_rewards};

    #[test]
    fn rejects_user_referencing_unknown_activity() {
        let mut user = User::new("x", UserRole::Graduate, 0);
        user.joined_activities.insert("ghost".to_string());
        let err = create_initial_state(user, seed_activities(), seed_rewards(), None).unwrap_err();
        assert!(matches!(err, LedgerError::Invariant(_)));
    }

    #[test]
    fn default_constants_apply() {
        let user = User::new("x", UserRole::Graduate, 0);
        let state = create_initial_state(user, seed_activities(), Vec::new(), None).unwrap();
        assert_eq!(state.constants.completion_points, 50);
    }
}
