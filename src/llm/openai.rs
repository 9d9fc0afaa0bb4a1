//! `OpenAI` (hosted) client.

use super::{LlmProvider, prompts, status_error, transport_error};
use crate::models::DEFAULT_HOSTED_MODEL;
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "openai";

/// Sampling temperature for extraction requests.
const TEMPERATURE: f32 = 0.5;

/// `OpenAI` chat-completion client.
///
/// Holds no process-wide state: the API key is injected by whoever builds the
/// client for a request.
pub struct OpenAiClient {
    /// API key.
    api_key: Option<SecretString>,
    /// API endpoint.
    endpoint: String,
    /// Model to use.
    model: String,
    /// HTTP client.
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Default API endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.openai.com/v1";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = DEFAULT_HOSTED_MODEL;

    /// Creates a new client with no API key.
    #[must_use]
    pub fn new() -> Self {
        Self {
            api_key: None,
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: SecretString) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Shares an existing HTTP client (and its connection pool).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Returns the configured API key.
    fn api_key(&self) -> Result<&SecretString> {
        self.api_key.as_ref().ok_or_else(|| {
            tracing::error!(provider = PROVIDER, model = %self.model, "OPENAI_API_KEY not set");
            Error::Provider {
                provider: PROVIDER,
                cause: "OPENAI_API_KEY not set".to_string(),
            }
        })
    }

    /// Makes a request to the Chat Completions API.
    async fn request(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let api_key = self.api_key()?;

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: TEMPERATURE,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        tracing::debug!(
            provider = PROVIDER,
            model = %self.model,
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, &self.model, &e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(PROVIDER, &self.model, status, &body));
        }

        let response: ChatCompletionResponse = response.json().await.map_err(|e| {
            tracing::error!(
                provider = PROVIDER,
                model = %self.model,
                error = %e,
                "Failed to decode chat completion response"
            );
            Error::Provider {
                provider: PROVIDER,
                cause: "invalid response body".to_string(),
            }
        })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                tracing::error!(
                    provider = PROVIDER,
                    model = %self.model,
                    "Chat completion returned no content"
                );
                Error::Provider {
                    provider: PROVIDER,
                    cause: "no content in response".to_string(),
                }
            })
    }
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmProvider for OpenAiClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn invoke(&self, chat_text: &str) -> Result<String> {
        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: Some(prompts::HOSTED_SYSTEM_PROMPT.to_string()),
            },
            ChatMessage {
                role: "user".to_string(),
                content: Some(prompts::hosted_user_prompt(chat_text)),
            },
        ];

        self.request(messages).await
    }
}

/// Request to the Chat Completions API.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

/// Constrains the completion to a JSON object.
#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// A message in the chat.
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

/// Response from the Chat Completions API.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

/// A choice in the response.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
