//! LLM client abstraction.
//!
//! Both backends implement [`LlmProvider`]; [`Invoker`] picks one from a
//! [`ModelConfig`] for each request.

mod credentials;
mod ollama;
mod openai;
pub mod prompts;

pub use credentials::{Credentials, OPENAI_API_KEY_ENV};
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use crate::models::{ModelConfig, Provider};
use crate::{Error, Result};
use std::future::Future;

/// Trait for LLM providers.
pub trait LlmProvider: Send + Sync {
    /// The provider name.
    fn name(&self) -> &'static str;

    /// The model the provider will be asked to run.
    fn model(&self) -> &str;

    /// Sends the extraction prompt for `chat_text` and returns the raw model
    /// output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Provider`] on network failure, a non-success status,
    /// or an empty response.
    fn invoke(&self, chat_text: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Provider endpoints that are not part of the per-request [`ModelConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Base URL of the hosted chat-completion API.
    pub openai_endpoint: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            openai_endpoint: OpenAiClient::DEFAULT_ENDPOINT.to_string(),
        }
    }
}

/// The provider chosen for one request.
pub enum Invoker {
    /// Hosted chat-completion API.
    Hosted(OpenAiClient),
    /// Local generate endpoint.
    Local(OllamaClient),
}

impl Invoker {
    /// Builds the invoker selected by `config`.
    ///
    /// Credentials are injected here rather than read from the environment, so
    /// each request carries exactly what the caller configured.
    #[must_use]
    pub fn select(
        config: &ModelConfig,
        credentials: &Credentials,
        settings: &ProviderSettings,
        client: &reqwest::Client,
    ) -> Self {
        match config.provider {
            Provider::Hosted => {
                let mut hosted = OpenAiClient::new()
                    .with_http_client(client.clone())
                    .with_endpoint(settings.openai_endpoint.as_str())
                    .with_model(config.hosted_model_name.as_str());
                if let Some(key) = credentials.openai_api_key() {
                    hosted = hosted.with_api_key(key.clone());
                }
                Self::Hosted(hosted)
            },
            Provider::Local => Self::Local(
                OllamaClient::new()
                    .with_http_client(client.clone())
                    .with_endpoint(config.local_endpoint_url.as_str())
                    .with_model(config.local_model_name.as_str()),
            ),
        }
    }

    /// Returns the provider this invoker talks to.
    #[must_use]
    pub const fn provider(&self) -> Provider {
        match self {
            Self::Hosted(_) => Provider::Hosted,
            Self::Local(_) => Provider::Local,
        }
    }
}

impl LlmProvider for Invoker {
    fn name(&self) -> &'static str {
        match self {
            Self::Hosted(client) => client.name(),
            Self::Local(client) => client.name(),
        }
    }

    fn model(&self) -> &str {
        match self {
            Self::Hosted(client) => client.model(),
            Self::Local(client) => client.model(),
        }
    }

    async fn invoke(&self, chat_text: &str) -> Result<String> {
        match self {
            Self::Hosted(client) => client.invoke(chat_text).await,
            Self::Local(client) => client.invoke(chat_text).await,
        }
    }
}

/// Logs and classifies a failed HTTP send.
fn transport_error(provider: &'static str, model: &str, e: &reqwest::Error) -> Error {
    let error_kind = if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect"
    } else if e.is_builder() {
        "invalid_url"
    } else if e.is_request() {
        "request"
    } else {
        "unknown"
    };
    tracing::error!(
        provider = provider,
        model = %model,
        error = %e,
        error_kind = error_kind,
        is_timeout = e.is_timeout(),
        is_connect = e.is_connect(),
        is_builder = e.is_builder(),
        "LLM request failed"
    );
    let cause = match error_kind {
        "invalid_url" => "invalid endpoint URL".to_string(),
        kind => format!("{kind} error"),
    };
    Error::Provider { provider, cause }
}

/// Logs a non-success response and builds an error carrying only the status.
///
/// The upstream body stays in the server log.
fn status_error(
    provider: &'static str,
    model: &str,
    status: reqwest::StatusCode,
    body: &str,
) -> Error {
    tracing::error!(
        provider = provider,
        model = %model,
        status = %status,
        body = %body,
        "LLM API returned error status"
    );
    Error::Provider {
        provider,
        cause: format!("upstream returned {status}"),
    }
}
