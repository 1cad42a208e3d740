//! Groq chat-completions client
//!
//! Speaks the OpenAI-compatible `/chat/completions` protocol.
//! Uses a long-lived reqwest::Client for connection pooling.

use crate::error::ReconcileError;
use crate::models::OracleRequest;
use crate::oracle::Oracle;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// Reusable Groq client (connection-pooled)
pub struct GroqClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GroqClient {
    pub fn new(api_key: String, base_url: String) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }
}

#[async_trait]
impl Oracle for GroqClient {
    async fn complete(&self, request: &OracleRequest) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(ReconcileError::Config("GROQ_API_KEY not configured".to_string()));
        }

        let body = ChatRequest::from(request);

        debug!(model = %request.model, "Calling Groq API");

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Groq API request failed: {}", e);
                ReconcileError::OracleCallFailure(format!("Groq API error: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Groq API error response: {}", error_text);
            return Err(ReconcileError::OracleCallFailure(format!(
                "Groq API returned {}: {}",
                status, error_text
            )));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Groq response: {}", e);
            ReconcileError::OracleCallFailure(format!("Groq parse error: {}", e))
        })?;

        extract_content(chat)
    }
}

fn extract_content(response: ChatResponse) -> Result<String> {
    let choice = response.choices.into_iter().next().ok_or_else(|| {
        ReconcileError::OracleCallFailure("No choices in Groq response".to_string())
    })?;

    debug!(finish_reason = ?choice.finish_reason, "Groq completion received");

    Ok(choice.message.content)
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl From<&OracleRequest> for ChatRequest {
    fn from(request: &OracleRequest) -> Self {
        Self {
            messages: vec![ChatMessage {
                role: "system".to_string(),
                content: request.prompt.clone(),
            }],
            model: request.model.clone(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
    finish_reason: Option<String>,
}
