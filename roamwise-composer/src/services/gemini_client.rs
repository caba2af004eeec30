//! Generative text backend client
//!
//! Each call is stateless: the full turn list (preamble, exemplar, prompt)
//! travels with every request and nothing is kept between calls.

use async_trait::async_trait;
use roamwise_common::config::GeneratorConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Generative backend errors
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Generator API key not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Backend returned no text")]
    EmptyResponse,

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Speaker of one conversational turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One conversational turn sent as context
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// Conversational request/response text generation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend identifier for logs
    fn backend_id(&self) -> &'static str;

    /// Send the turns, return the reply text of the final turn
    async fn generate(&self, turns: &[ChatTurn]) -> Result<String, GeneratorError>;

    fn is_available(&self) -> bool {
        true
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: ChatRole,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &GeneratorConfig, api_key: Option<String>) -> Result<Self, GeneratorError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| GeneratorError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn backend_id(&self) -> &'static str {
        "Gemini"
    }

    async fn generate(&self, turns: &[ChatTurn]) -> Result<String, GeneratorError> {
        let api_key = self.api_key.as_deref().ok_or(GeneratorError::NotConfigured)?;

        let body = GenerateRequest {
            contents: turns
                .iter()
                .map(|turn| Content {
                    role: turn.role,
                    parts: [Part { text: &turn.text }],
                })
                .collect(),
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!(model = %self.model, turns = turns.len(), "Requesting generation");

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| GeneratorError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GeneratorError::ApiError(status.as_u16(), error_text));
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::ParseError(e.to_string()))?;

        let text: String = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GeneratorError::EmptyResponse);
        }

        Ok(text)
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let turns = vec![ChatTurn::user("hello"), ChatTurn::model("{}")];
        let body = GenerateRequest {
            contents: turns
                .iter()
                .map(|turn| Content {
                    role: turn.role,
                    parts: [Part { text: &turn.text }],
                })
                .collect(),
        };

        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let client = GeminiClient::new(&GeneratorConfig::default(), None).unwrap();

        assert!(!client.is_available());
        let err = client.generate(&[ChatTurn::user("hi")]).await.unwrap_err();
        assert!(matches!(err, GeneratorError::NotConfigured));
    }
}
