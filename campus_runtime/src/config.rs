//! Configuration for the `campus` CLI.
//!
//! CLI arguments with environment variable fallbacks, via clap.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use campus_ledger::domain::{ActivityCategory, LedgerState};

use crate::error::SessionError;
use crate::recommend::chat::{DEFAULT_API_URL, DEFAULT_MODEL};
use crate::recommend::{ChatCompletionsRecommender, OfflineRecommender, Recommender};
use crate::session::Session;

/// Campus activity ledger: join, complete, redeem.
#[derive(Parser, Debug, Clone)]
#[command(name = "campus")]
#[command(about = "Campus activity engagement and rewards ledger")]
pub struct Args {
    /// Directory holding journaled sessions. Omit for an in-memory session.
    #[arg(long, env = "CAMPUS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Session identifier (one directory per session under --data-dir)
    #[arg(long, env = "CAMPUS_SESSION", default_value = "default")]
    pub session: String,

    /// Snapshot every N journaled events (0 disables)
    #[arg(long, env = "CAMPUS_SNAPSHOT_INTERVAL", default_value = "10")]
    pub snapshot_interval: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Force English output regardless of the user's role
    #[arg(long)]
    pub english: bool,

    /// Recommendation backend
    #[arg(long, env = "AI_BACKEND", value_enum, default_value_t = AiBackend::Offline)]
    pub ai_backend: AiBackend,

    /// API key for the chat-completions backend
    #[arg(long, env = "AI_API_KEY", hide_env_values = true)]
    pub ai_api_key: Option<String>,

    /// Chat-completions endpoint
    #[arg(long, env = "AI_API_URL", default_value = DEFAULT_API_URL)]
    pub ai_api_url: String,

    /// Chat model name
    #[arg(long, env = "AI_MODEL", default_value = DEFAULT_MODEL)]
    pub ai_model: String,

    /// HTTP timeout for the chat backend in milliseconds
    #[arg(long, env = "AI_TIMEOUT_MS", default_value = "15000")]
    pub ai_timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AiBackend {
    Offline,
    Chat,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the user's balance, activities and affordable rewards
    Status,
    /// List catalog activities
    Catalog {
        #[arg(long)]
        category: Option<ActivityCategory>,
    },
    /// Register for an activity
    Join { activity_id: String },
    /// Mark a joined activity as completed (+50 points)
    Complete { activity_id: String },
    /// Toggle the saved flag on an activity
    Save { activity_id: String },
    /// Redeem a listed reward
    Redeem { reward_id: String },
    /// Review an activity
    Review {
        activity_id: String,
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        content: String,
    },
    /// Ask the collaborator for activity suggestions
    Recommend {
        /// Interests (repeatable); defaults to the user's preferences
        #[arg(long = "interest")]
        interests: Vec<ActivityCategory>,
    },
    /// One-line summary of an activity
    Summarize { activity_id: String },
    /// Replay the journal and check it against the latest snapshot
    Replay,
}

impl Args {
    pub fn validate(&self) -> Result<(), String> {
        if self.session.is_empty()
            || !self
                .session
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(format!(
                "CAMPUS_SESSION must be non-empty ASCII letters, digits, '-' or '_': {:?}",
                self.session
            ));
        }
        if self.ai_backend == AiBackend::Chat && self.ai_timeout_ms == 0 {
            return Err("AI_TIMEOUT_MS must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_millis(self.ai_timeout_ms)
    }

    /// Collaborator selected by `--ai-backend`.
    pub fn build_recommender(&self) -> Box<dyn Recommender> {
        match self.ai_backend {
            AiBackend::Offline => Box::new(OfflineRecommender::new()),
            AiBackend::Chat => Box::new(ChatCompletionsRecommender::new(
                self.ai_api_url.clone(),
                self.ai_model.clone(),
                self.ai_api_key.clone(),
                self.ai_timeout(),
            )),
        }
    }

    /// Journaled when `--data-dir` is set, in-memory otherwise.
    pub fn open_session(&self, seed: LedgerState) -> Result<Session, SessionError> {
        match &self.data_dir {
            Some(dir) => Session::open(dir, &self.session, seed, self.snapshot_interval),
            None => Session::in_memory(seed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_offline_and_in_memory() {
        let args = Args::try_parse_from(["campus", "status"]).unwrap();
        assert_eq!(args.ai_backend, AiBackend::Offline);
        assert!(args.data_dir.is_none());
        assert_eq!(args.ai_model, "glm-4-flash");
        assert!(args.validate().is_ok());
    }

    #[test]
    fn parses_review_and_interests() {
        let args = Args::try_parse_from([
            "campus", "review", "A1", "--rating", "4", "--content", "nice",
        ])
        .unwrap();
        assert!(matches!(args.command, Command::Review { rating: 4, .. }));

        let args = Args::try_parse_from([
            "campus", "recommend", "--interest", "sports", "--interest", "Career",
        ])
        .unwrap();
        match args.command {
            Command::Recommend { interests } => assert_eq!(
                interests,
                vec![ActivityCategory::Sports, ActivityCategory::Career]
            ),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn rejects_path_like_session() {
        let args = Args::try_parse_from(["campus", "--session", "../x", "status"]).unwrap();
        assert!(args.validate().is_err());
    }
}
