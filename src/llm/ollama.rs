//! Ollama (local) client.

use super::{LlmProvider, prompts, status_error, transport_error};
use crate::models::{DEFAULT_LOCAL_ENDPOINT, DEFAULT_LOCAL_MODEL};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "ollama";

/// Ollama local LLM client.
///
/// Uses the non-streaming `/api/generate` operation with JSON output mode.
pub struct OllamaClient {
    /// API endpoint.
    endpoint: String,
    /// Model to use.
    model: String,
    /// HTTP client.
    client: reqwest::Client,
}

impl OllamaClient {
    /// Default API endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = DEFAULT_LOCAL_ENDPOINT;

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = DEFAULT_LOCAL_MODEL;

    /// Creates a new Ollama client with the default endpoint and model.
    #[must_use]
    pub fn new() -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            client: reqwest::Client::new(),
        }
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

    /// Returns the configured endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Makes a request to the Generate API.
    async fn generate(&self, prompt: String) -> Result<String> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
            format: "json",
        };

        tracing::debug!(
            provider = PROVIDER,
            model = %self.model,
            endpoint = %self.endpoint,
            "Sending generate request"
        );

        let response = self
            .client
            .post(format!("{}/api/generate", self.endpoint))
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, &self.model, &e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(PROVIDER, &self.model, status, &body));
        }

        let response: GenerateResponse = response.json().await.map_err(|e| {
            tracing::error!(
                provider = PROVIDER,
                model = %self.model,
                error = %e,
                "Failed to decode generate response"
            );
            Error::Provider {
                provider: PROVIDER,
                cause: "invalid response body".to_string(),
            }
        })?;

        if response.response.trim().is_empty() {
            tracing::error!(
                provider = PROVIDER,
                model = %self.model,
                "Generate returned no content"
            );
            return Err(Error::Provider {
                provider: PROVIDER,
                cause: "no content in response".to_string(),
            });
        }

        Ok(response.response)
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmProvider for OllamaClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn invoke(&self, chat_text: &str) -> Result<String> {
        self.generate(prompts::local_prompt(chat_text)).await
    }
}

/// Request to the Generate API.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    format: &'static str,
}

/// Response from the Generate API.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}
