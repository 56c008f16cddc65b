//! Campus Ledger: Core Domain Types
//!
//! Pure data plus read-only helpers. Transition logic lives in `transitions`.
//! Points: u64. Registration counters: u32.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::events::IntentKind;

/// Points credited by a successful Complete.
pub const COMPLETION_POINTS: u64 = 50;

// ── Enumerations ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActivityCategory {
    Academic,
    Social,
    Culture,
    Sports,
    Career,
    Volunteer,
}

impl ActivityCategory {
    pub const ALL: [ActivityCategory; 6] = [
        ActivityCategory::Academic,
        ActivityCategory::Social,
        ActivityCategory::Culture,
        ActivityCategory::Sports,
        ActivityCategory::Career,
        ActivityCategory::Volunteer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Academic => "Academic",
            ActivityCategory::Social => "Social",
            ActivityCategory::Culture => "Culture",
            ActivityCategory::Sports => "Sports",
            ActivityCategory::Career => "Career",
            ActivityCategory::Volunteer => "Volunteer",
        }
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown activity category {:?}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "Freshman/Sophomore")]
    UndergradLow,
    #[serde(rename = "Junior/Senior")]
    UndergradHigh,
    #[serde(rename = "Graduate Student")]
    Graduate,
    #[serde(rename = "International Student")]
    International,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [
        UserRole::UndergradLow,
        UserRole::UndergradHigh,
        UserRole::Graduate,
        UserRole::International,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::UndergradLow => "Freshman/Sophomore",
            UserRole::UndergradHigh => "Junior/Senior",
            UserRole::Graduate => "Graduate Student",
            UserRole::International => "International Student",
        }
    }

    pub fn is_international(&self) -> bool {
        matches!(self, UserRole::International)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown user role {:?}", s))
    }
}

/// Display language for notices and collaborator output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Chinese,
}

impl Language {
    /// International students get English; everyone else the local language.
    pub fn for_role(role: UserRole) -> Self {
        if role.is_international() {
            Language::English
        } else {
            Language::Chinese
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Language::English => Language::Chinese,
            Language::Chinese => Language::English,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Upcoming,
    Completed,
    Cancelled,
}

// ── Records ────────────────────────────────────────────────────────

/// A campus activity. Only `registered_count` ever changes after load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Activity {
    pub id: String,
    pub title: String,
    pub title_en: Option<String>,
    pub organizer: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub category: ActivityCategory,
    pub description: String,
    pub description_en: Option<String>,
    pub image: String,
    pub external_link: Option<String>,
    pub tags: Vec<String>,
    pub registered_count: u32,
    pub max_capacity: u32,
    pub status: Option<ActivityStatus>,
}

impl Activity {
    /// Title in the requested language, falling back to the local title.
    pub fn display_title(&self, language: Language) -> &str {
        match (language, &self.title_en) {
            (Language::English, Some(en)) => en,
            _ => &self.title,
        }
    }

    pub fn display_description(&self, language: Language) -> &str {
        match (language, &self.description_en) {
            (Language::English, Some(en)) => en,
            _ => &self.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reward {
    pub id: String,
    pub title: String,
    pub cost: u64,
    pub icon: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Review {
    pub id: String,
    pub activity_id: String,
    pub activity_title: String,
    pub rating: u8,
    pub content: String,
    pub timestamp: String,
}

/// Per-user engagement record.
///
/// `joined_activities` and `completed_activities` are disjoint.
/// `redeemed_rewards` and `reviews` only ever grow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    pub name: String,
    pub avatar: Option<String>,
    pub role: UserRole,
    pub preferences: Vec<ActivityCategory>,
    pub joined_activities: BTreeSet<String>,
    pub completed_activities: BTreeSet<String>,
    pub saved_activities: BTreeSet<String>,
    pub redeemed_rewards: Vec<String>,
    pub points: u64,
    pub reviews: Vec<Review>,
}

impl User {
    /// A fresh user with no engagement history.
    pub fn new(name: impl Into<String>, role: UserRole, points: u64) -> Self {
        Self {
            name: name.into(),
            avatar: None,
            role,
            preferences: Vec::new(),
            joined_activities: BTreeSet::new(),
            completed_activities: BTreeSet::new(),
            saved_activities: BTreeSet::new(),
            redeemed_rewards: Vec::new(),
            points,
            reviews: Vec::new(),
        }
    }

    pub fn has_joined(&self, activity_id: &str) -> bool {
        self.joined_activities.contains(activity_id)
    }

    pub fn has_completed(&self, activity_id: &str) -> bool {
        self.completed_activities.contains(activity_id)
    }

    pub fn has_saved(&self, activity_id: &str) -> bool {
        self.saved_activities.contains(activity_id)
    }
}

/// Tunable ledger constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConstants {
    pub completion_points: u64,
}

impl Default for LedgerConstants {
    fn default() -> Self {
        Self {
            completion_points: COMPLETION_POINTS,
        }
    }
}

/// Complete session snapshot: the explicit context every transition
/// consumes and returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerState {
    pub user: User,
    pub catalog: Catalog,
    pub rewards: Vec<Reward>,
    pub constants: LedgerConstants,
}

impl LedgerState {
    pub fn reward(&self, reward_id: &str) -> Option<&Reward> {
        self.rewards.iter().find(|r| r.id == reward_id)
    }
}

// ── Transition outcome ─────────────────────────────────────────────

/// Why a transition left the state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoOpReason {
    UnknownActivity,
    AlreadyJoined,
    AlreadyCompleted,
    NotJoined,
    InsufficientPoints { balance: u64, cost: u64 },
    InvalidRating { rating: u8 },
    EmptyReview,
    CounterOverflow,
    PointsOverflow,
}

impl fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoOpReason::UnknownActivity => f.write_str("activity is not in the catalog"),
            NoOpReason::AlreadyJoined => f.write_str("activity already joined"),
            NoOpReason::AlreadyCompleted => f.write_str("activity already completed"),
            NoOpReason::NotJoined => f.write_str("activity was never joined"),
            NoOpReason::InsufficientPoints { balance, cost } => {
                write!(f, "balance {} is below cost {}", balance, cost)
            }
            NoOpReason::InvalidRating { rating } => {
                write!(f, "rating {} is outside 1..=5", rating)
            }
            NoOpReason::EmptyReview => f.write_str("review content is empty"),
            NoOpReason::CounterOverflow => f.write_str("registration counter would overflow"),
            NoOpReason::PointsOverflow => f.write_str("points balance would overflow"),
        }
    }
}

/// Structured, immutable outcome of a transition.
///
/// `applied == false` means a guarded no-op: the returned state is the
/// input state, unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionResult {
    pub intent: IntentKind,
    pub applied: bool,
    pub reason: Option<NoOpReason>,
    pub points_before: u64,
    pub points_after: u64,
    /// New `registered_count` of the joined activity (applied Join only).
    pub registered_count: Option<u32>,
}

impl TransitionResult {
    pub fn points_delta(&self) -> i128 {
        self.points_after as i128 - self.points_before as i128
    }
}
