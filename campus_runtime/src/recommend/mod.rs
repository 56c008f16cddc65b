//! Recommendation collaborator: a trait with interchangeable backends.
//!
//! - `OfflineRecommender`: deterministic, no network
//! - `ChatCompletionsRecommender`: OpenAI-compatible HTTP API

pub mod chat;
pub mod offline;
pub mod prompt;
pub mod traits;

pub use chat::ChatCompletionsRecommender;
pub use offline::OfflineRecommender;
pub use traits::{CollaboratorError, RecommendationRequest, Recommender};
