//! View routing and user-facing notices.
//!
//! The router owns navigation only. Every ledger mutation goes through
//! `dispatch`, which forwards to the session and picks the confirmation
//! text to show.

use campus_ledger::domain::{
    Activity, ActivityCategory, Language, LedgerState, Review, Reward, TransitionResult, UserRole,
};
use campus_ledger::events::{Intent, IntentKind};

use crate::error::SessionError;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Activities,
    Interaction,
    MyActivities,
    ActivityDetail,
    CategoryDetail,
    Login,
}

/// Outcome of a dispatched intent.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub result: TransitionResult,
    /// Confirmation shown to the user, if this intent has one.
    pub notice: Option<String>,
}

/// Confirmation text for `kind`. Shown regardless of whether the
/// transition applied. The Complete text quotes `completion_points`.
pub fn notice(kind: IntentKind, language: Language, completion_points: u64) -> Option<String> {
    let text = match (kind, language) {
        (IntentKind::Join, Language::English) => "Registration Successful!".to_string(),
        (IntentKind::Join, Language::Chinese) => "报名成功！".to_string(),
        (IntentKind::Complete, Language::English) => {
            format!("Activity Completed! +{} Points", completion_points)
        }
        (IntentKind::Complete, Language::Chinese) => {
            format!("活动已完成！获得 {} 积分", completion_points)
        }
        (IntentKind::RedeemReward, Language::English) => "Reward Redeemed Successfully!".to_string(),
        (IntentKind::RedeemReward, Language::Chinese) => "奖励兑换成功！".to_string(),
        (IntentKind::ToggleSave | IntentKind::SubmitReview, _) => return None,
    };
    Some(text)
}

#[derive(Debug, Clone)]
pub struct ViewRouter {
    screen: Screen,
    selected_activity: Option<String>,
    selected_category: Option<ActivityCategory>,
    language: Language,
    logged_in: bool,
}

impl ViewRouter {
    /// Start on Home, logged in, in the role's default language.
    pub fn new(role: UserRole) -> Self {
        Self {
            screen: Screen::Home,
            selected_activity: None,
            selected_category: None,
            language: Language::for_role(role),
            logged_in: true,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn toggle_language(&mut self) -> Language {
        self.language = self.language.toggled();
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn login(&mut self) {
        self.logged_in = true;
        self.screen = Screen::Home;
    }

    pub fn logout(&mut self) {
        self.logged_in = false;
        self.screen = Screen::Login;
    }

    pub fn navigate(&mut self, screen: Screen) {
        self.screen = screen;
    }

    pub fn view_activity_detail(&mut self, activity_id: impl Into<String>) {
        self.selected_activity = Some(activity_id.into());
        self.screen = Screen::ActivityDetail;
    }

    pub fn select_category(&mut self, category: ActivityCategory) {
        self.selected_category = Some(category);
        self.screen = Screen::CategoryDetail;
    }

    pub fn selected_activity(&self) -> Option<&str> {
        self.selected_activity.as_deref()
    }

    pub fn selected_category(&self) -> Option<ActivityCategory> {
        self.selected_category
    }

    /// The screen to render. Drill-down screens without a usable
    /// selection fall back to Home.
    pub fn resolve(&self, state: &LedgerState) -> Screen {
        match self.screen {
            Screen::ActivityDetail => match self.selected_activity.as_deref() {
                Some(id) if state.catalog.contains(id) => Screen::ActivityDetail,
                _ => Screen::Home,
            },
            Screen::CategoryDetail if self.selected_category.is_none() => Screen::Home,
            other => other,
        }
    }

    pub fn dispatch(&self, session: &mut Session, intent: Intent) -> Result<Dispatch, SessionError> {
        let kind = intent.kind();
        let completion_points = session.state().constants.completion_points;
        let result = session.apply(intent)?;
        Ok(Dispatch {
            result,
            notice: notice(kind, self.language, completion_points),
        })
    }

    /// Redeem a reward from the listed rewards at its listed cost.
    /// Unknown reward ids dispatch nothing.
    pub fn redeem_listed(
        &self,
        session: &mut Session,
        reward_id: &str,
    ) -> Result<Option<Dispatch>, SessionError> {
        let Some(cost) = session.state().reward(reward_id).map(|r| r.cost) else {
            return Ok(None);
        };
        self.dispatch(session, Intent::redeem(reward_id, cost)).map(Some)
    }
}

/// Joined activities, catalog order.
pub fn upcoming(state: &LedgerState) -> Vec<&Activity> {
    state
        .catalog
        .iter()
        .filter(|a| state.user.has_joined(&a.id))
        .collect()
}

/// Completed activities, catalog order.
pub fn past(state: &LedgerState) -> Vec<&Activity> {
    state
        .catalog
        .iter()
        .filter(|a| state.user.has_completed(&a.id))
        .collect()
}

pub fn affordable_rewards(state: &LedgerState) -> Vec<&Reward> {
    state
        .rewards
        .iter()
        .filter(|r| r.cost <= state.user.points)
        .collect()
}

/// Build a review of a catalog activity. `None` for unknown activities.
pub fn compose_review(
    state: &LedgerState,
    activity_id: &str,
    rating: u8,
    content: impl Into<String>,
    timestamp: impl Into<String>,
) -> Option<Review> {
    let activity = state.catalog.get(activity_id)?;
    Some(Review {
        id: format!("review-{}", state.user.reviews.len() + 1),
        activity_id: activity.id.clone(),
        activity_title: activity.title.clone(),
        rating,
        content: content.into(),
        timestamp: timestamp.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_ledger::domain::LedgerConstants;
    use campus_ledger::seed::{seed_activities, seed_rewards, seed_user, seeded_state};
    use campus_ledger::state::create_initial_state;

    fn session() -> Session {
        Session::in_memory(seeded_state()).unwrap()
    }

    #[test]
    fn language_follows_role() {
        assert_eq!(ViewRouter::new(UserRole::International).language(), Language::English);
        assert_eq!(ViewRouter::new(UserRole::UndergradLow).language(), Language::Chinese);
        let mut r = ViewRouter::new(UserRole::Graduate);
        assert_eq!(r.toggle_language(), Language::English);
    }

    #[test]
    fn notice_is_shown_even_for_noops() {
        let mut s = session();
        let r = ViewRouter::new(UserRole::International);
        let d = r.dispatch(&mut s, Intent::complete("A1")).unwrap();
        assert!(!d.result.applied);
        assert_eq!(d.notice.as_deref(), Some("Activity Completed! +50 Points"));
    }

    #[test]
    fn completion_notice_quotes_configured_points() {
        let state = create_initial_state(
            seed_user(),
            seed_activities(),
            seed_rewards(),
            Some(LedgerConstants { completion_points: 30 }),
        )
        .unwrap();
        let mut s = Session::in_memory(state).unwrap();
        s.apply(Intent::join("A1")).unwrap();

        let mut r = ViewRouter::new(UserRole::International);
        let d = r.dispatch(&mut s, Intent::complete("A1")).unwrap();
        assert_eq!(d.result.points_delta(), 30);
        assert_eq!(d.notice.as_deref(), Some("Activity Completed! +30 Points"));

        r.set_language(Language::Chinese);
        assert_eq!(
            notice(IntentKind::Complete, r.language(), 30).as_deref(),
            Some("活动已完成！获得 30 积分")
        );
    }

    #[test]
    fn save_has_no_notice() {
        let mut s = session();
        let r = ViewRouter::new(UserRole::UndergradLow);
        let d = r.dispatch(&mut s, Intent::toggle_save("A1")).unwrap();
        assert!(d.result.applied);
        assert_eq!(d.notice, None);
    }

    #[test]
    fn redeem_listed_uses_listed_cost() {
        let mut s = session();
        let r = ViewRouter::new(UserRole::UndergradLow);
        let d = r.redeem_listed(&mut s, "coffee").unwrap().unwrap();
        assert_eq!(d.notice.as_deref(), Some("奖励兑换成功！"));
        assert_eq!(s.state().user.points, 20);
        assert!(r.redeem_listed(&mut s, "yacht").unwrap().is_none());
        assert_eq!(s.current_sequence(), 1);
    }

    #[test]
    fn resolve_falls_back_to_home() {
        let state = seeded_state();
        let mut r = ViewRouter::new(UserRole::UndergradLow);
        r.view_activity_detail("ghost");
        assert_eq!(r.resolve(&state), Screen::Home);
        r.view_activity_detail("A2");
        assert_eq!(r.resolve(&state), Screen::ActivityDetail);
        r.navigate(Screen::CategoryDetail);
        assert_eq!(r.resolve(&state), Screen::Home);
        r.select_category(ActivityCategory::Sports);
        assert_eq!(r.resolve(&state), Screen::CategoryDetail);
        r.logout();
        assert_eq!(r.resolve(&state), Screen::Login);
        assert!(!r.is_logged_in());
    }

    #[test]
    fn my_activities_views() {
        let mut s = session();
        s.apply(Intent::join("A4")).unwrap();
        s.apply(Intent::join("A1")).unwrap();
        s.apply(Intent::complete("A4")).unwrap();
        let state = s.state();
        let ids = |v: Vec<&Activity>| v.into_iter().map(|a| a.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(upcoming(state)), vec!["A1"]);
        assert_eq!(ids(past(state)), vec!["A4"]);
        let affordable: Vec<_> = affordable_rewards(state).into_iter().map(|r| r.id.as_str()).collect();
        assert_eq!(affordable, vec!["coffee"]);
    }
}
