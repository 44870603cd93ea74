//! Gemini implementation of the completion model.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ServiceError, ServiceResult};
use crate::model::CompletionModel;
use crate::security::ApiKey;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Gemini REST client.
///
/// Calls `generateContent` with the API key in a request header, so
/// credentials never appear in URLs or logs.
#[derive(Clone)]
pub struct GeminiModel {
    client: Client,
    model: String,
    base_url: String,
}

impl GeminiModel {
    /// Create a client for the default model.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Set the model identifier (default: `gemini-1.5-flash`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for proxies or test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Current model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Default for GeminiModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionModel for GeminiModel {
    async fn complete(&self, prompt: &str, key: &ApiKey) -> ServiceResult<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!(model = %self.model, key = %key.suffix(), "calling generateContent");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", key.secret().expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| ServiceError::Http(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Http(Box::new(e)))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or(ServiceError::EmptyResponse)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// Request/Response types

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides() {
        let model = GeminiModel::new()
            .with_model("gemini-1.5-pro")
            .with_base_url("http://localhost:8080/v1beta");
        assert_eq!(model.model(), "gemini-1.5-pro");
        assert_eq!(model.base_url, "http://localhost:8080/v1beta");
    }

    #[test]
    fn response_shape_parses() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"{\"name\":null}"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.candidates[0].content.parts[0].text,
            "{\"name\":null}"
        );
    }
}
