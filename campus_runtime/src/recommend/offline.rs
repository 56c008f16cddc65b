//! Deterministic, network-free collaborator.

use async_trait::async_trait;

use campus_ledger::catalog::ActivityDigest;
use campus_ledger::domain::Language;

use super::prompt::{fallback_text, RECOMMENDATION_COUNT};
use super::traits::{CollaboratorError, RecommendationRequest, Recommender};

/// Characters kept by `summarize` before the ellipsis.
pub const SUMMARY_CHARS: usize = 20;

const SENTENCE_ENDS: &[char] = &['.', '!', '?', '。', '！', '？'];

#[derive(Debug, Default, Clone)]
pub struct OfflineRecommender;

impl OfflineRecommender {
    pub fn new() -> Self {
        Self
    }

    /// Up to two digests whose category is one of the interests, topped up
    /// from the front of the list.
    fn pick<'a>(request: &'a RecommendationRequest) -> Vec<&'a ActivityDigest> {
        let mut picked: Vec<&ActivityDigest> = request
            .activities
            .iter()
            .filter(|a| request.interests.contains(&a.category))
            .take(RECOMMENDATION_COUNT)
            .collect();
        for a in &request.activities {
            if picked.len() >= RECOMMENDATION_COUNT {
                break;
            }
            if !picked.iter().any(|p| p.title == a.title) {
                picked.push(a);
            }
        }
        picked
    }
}

#[async_trait]
impl Recommender for OfflineRecommender {
    fn id(&self) -> &str {
        "offline"
    }

    async fn recommend(&self, request: &RecommendationRequest) -> String {
        let language = request.language();
        let picked = Self::pick(request);
        if picked.is_empty() {
            return fallback_text(&CollaboratorError::EmptyContent, language).to_string();
        }

        let interests = request
            .interests
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let mut text = match language {
            Language::English => format!("Based on your interests ({}), you might enjoy:", interests),
            Language::Chinese => format!("根据你的兴趣（{}），推荐以下活动：", interests),
        };
        for (i, a) in picked.iter().enumerate() {
            text.push_str(&format!("\n{}. {} ({})", i + 1, a.title, a.category));
        }
        text
    }

    async fn summarize(&self, title: &str, description: &str) -> String {
        let sentence = description
            .split(SENTENCE_ENDS)
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or(title);

        if sentence.chars().count() <= SUMMARY_CHARS {
            sentence.to_string()
        } else {
            let mut short: String = sentence.chars().take(SUMMARY_CHARS).collect();
            short.push('…');
            short
        }
    }
}
