//! The recommendation collaborator seam.
//!
//! Collaborators are stateless and never see ledger mutations. Their
//! failures are folded into fallback text, so callers get a `String`
//! either way.

use async_trait::async_trait;

use campus_ledger::catalog::ActivityDigest;
use campus_ledger::domain::{ActivityCategory, Language, LedgerState, UserRole};

use super::prompt::MAX_PROMPT_ACTIVITIES;

/// Reasons a collaborator call produced no usable text.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("response had no content")]
    EmptyContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationRequest {
    pub role: UserRole,
    pub interests: Vec<ActivityCategory>,
    pub activities: Vec<ActivityDigest>,
}

impl RecommendationRequest {
    /// Request for the session user. `interests` defaults to the user's
    /// stored preferences.
    pub fn for_user(state: &LedgerState, interests: Option<Vec<ActivityCategory>>) -> Self {
        Self {
            role: state.user.role,
            interests: interests.unwrap_or_else(|| state.user.preferences.clone()),
            activities: state.catalog.digest(MAX_PROMPT_ACTIVITIES),
        }
    }

    /// Language the answer should be written in.
    pub fn language(&self) -> Language {
        Language::for_role(self.role)
    }
}

#[async_trait]
pub trait Recommender: Send + Sync {
    /// Backend identifier for logs.
    fn id(&self) -> &str;

    /// Suggest activities for the requester.
    async fn recommend(&self, request: &RecommendationRequest) -> String;

    /// One-line summary of an activity. Falls back to `description`.
    async fn summarize(&self, title: &str, description: &str) -> String;
}
