// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chat completion client for plan generation.
//!
//! Handlers depend on the [`CompletionClient`] trait; production wires in
//! [`GroqClient`], which talks to Groq's OpenAI-compatible
//! `/chat/completions` endpoint in JSON mode.

use crate::config::Config;
use crate::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sampling temperature for plan generation (low, for stable structure).
pub const PLAN_TEMPERATURE: f32 = 0.4;

/// A single JSON-mode completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System message
    pub system: String,
    /// User message
    pub prompt: String,
    pub temperature: f32,
}

/// Source of model completions.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run a JSON-mode completion and return the first choice's content.
    ///
    /// A response with no content yields an empty string; deciding whether
    /// that is an error is up to the caller.
    async fn complete_json(&self, request: &CompletionRequest) -> Result<String, AppError>;
}

/// Groq API client.
#[derive(Clone)]
pub struct GroqClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GroqClient {
    /// Create a client from application config.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.completion_timeout_secs))
            .build()
            .map_err(|e| AppError::Completion(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.groq_base_url.trim_end_matches('/').to_string(),
            api_key: config.groq_api_key.clone(),
            model: config.groq_model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Check response status and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Completion API rate limit hit (429)");
                return Err(AppError::Completion("Rate limit exceeded".to_string()));
            }

            if status.as_u16() == 401 {
                return Err(AppError::Completion("Invalid API key".to_string()));
            }

            return Err(AppError::Completion(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Completion(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl CompletionClient for GroqClient {
    async fn complete_json(&self, request: &CompletionRequest) -> Result<String, AppError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: request.temperature,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Completion(e.to_string()))?;

        let completion: ChatCompletionResponse = self.check_response_json(response).await?;

        tracing::debug!(
            model = %self.model,
            choices = completion.choices.len(),
            "Completion received"
        );

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Chat completion response (only the fields we read).
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
