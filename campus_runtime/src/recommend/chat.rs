//! OpenAI-compatible `chat/completions` collaborator.
//!
//! Defaults point at the GLM endpoint. Any compatible server works by
//! overriding the URL and model.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::prompt::{
    fallback_text, recommend_user_prompt, summarize_user_prompt, RECOMMEND_SYSTEM_PROMPT,
    SUMMARIZE_SYSTEM_PROMPT,
};
use super::traits::{CollaboratorError, RecommendationRequest, Recommender};

pub const DEFAULT_API_URL: &str = "https://open.bigmodel.cn/api/paas/v4/chat/completions";
pub const DEFAULT_MODEL: &str = "glm-4-flash";

const RECOMMEND_TEMPERATURE: f32 = 0.7;
const RECOMMEND_MAX_TOKENS: u32 = 1024;
const SUMMARIZE_TEMPERATURE: f32 = 0.5;

pub struct ChatCompletionsRecommender {
    client: Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl ChatCompletionsRecommender {
    pub fn new(
        url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            url: url.into(),
            model: model.into(),
            // An empty key is as good as none.
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    async fn chat(
        &self,
        system: &str,
        user: String,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<String, CollaboratorError> {
        let api_key = self.api_key.as_ref().ok_or(CollaboratorError::MissingApiKey)?;

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system.to_string() },
                ChatMessage { role: "user", content: user },
            ],
            stream: false,
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(&self.url)
            .header(header::AUTHORIZATION, format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| CollaboratorError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::RequestFailed(format!("HTTP {}: {}", status, text)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::ParseError(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(CollaboratorError::EmptyContent)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageResponse,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

#[async_trait]
impl Recommender for ChatCompletionsRecommender {
    fn id(&self) -> &str {
        &self.model
    }

    async fn recommend(&self, request: &RecommendationRequest) -> String {
        let result = self
            .chat(
                RECOMMEND_SYSTEM_PROMPT,
                recommend_user_prompt(request),
                RECOMMEND_TEMPERATURE,
                Some(RECOMMEND_MAX_TOKENS),
            )
            .await;

        match result {
            Ok(text) => {
                debug!(model = %self.model, chars = text.chars().count(), "recommendation received");
                text
            }
            Err(e) => {
                warn!(model = %self.model, error = %e, "recommendation failed");
                fallback_text(&e, request.language()).to_string()
            }
        }
    }

    async fn summarize(&self, title: &str, description: &str) -> String {
        let result = self
            .chat(
                SUMMARIZE_SYSTEM_PROMPT,
                summarize_user_prompt(title, description),
                SUMMARIZE_TEMPERATURE,
                None,
            )
            .await;

        result.unwrap_or_else(|e| {
            warn!(model = %self.model, error = %e, "summary failed");
            description.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_key_counts_as_missing() {
        let r = ChatCompletionsRecommender::new(
            DEFAULT_API_URL,
            DEFAULT_MODEL,
            Some("  ".into()),
            Duration::from_secs(1),
        );
        assert!(r.api_key.is_none());
        assert_eq!(r.id(), DEFAULT_MODEL);
    }

    #[test]
    fn request_body_shape() {
        let body = ChatRequest {
            model: DEFAULT_MODEL,
            messages: vec![ChatMessage { role: "user", content: "hi".into() }],
            stream: false,
            temperature: 0.5,
            max_tokens: None,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["model"], "glm-4-flash");
        assert_eq!(v["stream"], false);
        assert!(v.get("max_tokens").is_none());
    }
}
