//! OpenAI-compatible chat-completions client.
//!
//! No retries, no rate limiting, no streaming: a single POST per generation,
//! with every failure mode folded into a sentinel-prefixed string per the
//! contract in [`crate::llm`].

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::LlmSettings;
use crate::llm::TextGenerator;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    error: Option<ApiError>,
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Shared HTTP client posting to a chat-completions endpoint.
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl ChatCompletionsClient {
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    async fn request(&self, system_message: &str, prompt: &str) -> Result<ChatResponse, String> {
        let payload = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_message,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .http
            .post(&self.settings.api_url)
            .bearer_auth(self.settings.api_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        response.json().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn generate(&self, system_message: &str, prompt: &str) -> String {
        let data = match self.request(system_message, prompt).await {
            Ok(data) => data,
            Err(e) => return format!("Request Failed: {e}"),
        };

        if let Some(err) = data.error {
            return format!("API Error: {}", err.message);
        }

        match data
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
        {
            Some(content) => content.trim().to_string(),
            None => "No response from API".to_string(),
        }
    }
}
