//! Provider selection and per-request model configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default hosted chat-completion model.
pub const DEFAULT_HOSTED_MODEL: &str = "gpt-3.5-turbo";

/// Default local model.
pub const DEFAULT_LOCAL_MODEL: &str = "llama3:8b";

/// Default local generate endpoint.
pub const DEFAULT_LOCAL_ENDPOINT: &str = "http://localhost:11434";

/// Which LLM backend handles an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Provider {
    /// Hosted chat-completion API (`OpenAI`).
    #[default]
    #[serde(rename = "openai", alias = "hosted")]
    Hosted,
    /// Local generate endpoint (Ollama).
    #[serde(rename = "ollama", alias = "local")]
    Local,
}

impl Provider {
    /// Returns the wire name of the provider.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hosted => "openai",
            Self::Local => "ollama",
        }
    }

    /// Parses a provider name, case-insensitively.
    ///
    /// Accepts the wire names (`openai`, `ollama`) and the role names
    /// (`hosted`, `local`).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "hosted" => Some(Self::Hosted),
            "ollama" | "local" => Some(Self::Local),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| Error::Validation(format!("Invalid model provider: '{s}'")))
    }
}

/// Model configuration for one analysis.
///
/// Built once per request from the caller's input layered over the server
/// defaults; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    /// Selected backend.
    pub provider: Provider,
    /// Model name used with the hosted provider.
    #[serde(rename = "openaiModel", alias = "hostedModelName")]
    pub hosted_model_name: String,
    /// Model name used with the local provider.
    #[serde(rename = "ollamaModel", alias = "localModelName")]
    pub local_model_name: String,
    /// Base URL of the local generate endpoint.
    #[serde(rename = "ollamaUrl", alias = "localEndpointUrl")]
    pub local_endpoint_url: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            hosted_model_name: DEFAULT_HOSTED_MODEL.to_string(),
            local_model_name: DEFAULT_LOCAL_MODEL.to_string(),
            local_endpoint_url: DEFAULT_LOCAL_ENDPOINT.to_string(),
        }
    }
}

impl ModelConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the provider.
    #[must_use]
    pub const fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    /// Sets the hosted model name.
    #[must_use]
    pub fn with_hosted_model(mut self, model: impl Into<String>) -> Self {
        self.hosted_model_name = model.into();
        self
    }

    /// Sets the local model name.
    #[must_use]
    pub fn with_local_model(mut self, model: impl Into<String>) -> Self {
        self.local_model_name = model.into();
        self
    }

    /// Sets the local endpoint URL.
    #[must_use]
    pub fn with_local_endpoint(mut self, url: impl Into<String>) -> Self {
        self.local_endpoint_url = url.into();
        self
    }

    /// Returns the model name for the selected provider.
    #[must_use]
    pub fn model_name(&self) -> &str {
        match self.provider {
            Provider::Hosted => &self.hosted_model_name,
            Provider::Local => &self.local_model_name,
        }
    }
}

/// Caller-supplied model configuration, as it arrives on the wire.
///
/// Every field is optional; [`ModelConfigInput::resolve`] fills gaps from the
/// server defaults and rejects unknown providers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfigInput {
    /// Provider name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Hosted model name.
    #[serde(default, alias = "hostedModelName", skip_serializing_if = "Option::is_none")]
    pub openai_model: Option<String>,
    /// Local model name.
    #[serde(default, alias = "localModelName", skip_serializing_if = "Option::is_none")]
    pub ollama_model: Option<String>,
    /// Local endpoint URL.
    #[serde(default, alias = "localEndpointUrl", skip_serializing_if = "Option::is_none")]
    pub ollama_url: Option<String>,
}

impl ModelConfigInput {
    /// Resolves the input against `defaults`.
    ///
    /// Blank model names and URLs fall back to the defaults; a provider that is
    /// present must name a known backend.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the provider is not recognized.
    pub fn resolve(self, defaults: &ModelConfig) -> Result<ModelConfig> {
        let provider = match self.provider {
            Some(name) => name.parse::<Provider>()?,
            None => defaults.provider,
        };

        Ok(ModelConfig {
            provider,
            hosted_model_name: non_blank(self.openai_model)
                .unwrap_or_else(|| defaults.hosted_model_name.clone()),
            local_model_name: non_blank(self.ollama_model)
                .unwrap_or_else(|| defaults.local_model_name.clone()),
            local_endpoint_url: non_blank(self.ollama_url)
                .unwrap_or_else(|| defaults.local_endpoint_url.clone()),
        })
    }
}

impl From<&ModelConfig> for ModelConfigInput {
    fn from(config: &ModelConfig) -> Self {
        Self {
            provider: Some(config.provider.as_str().to_string()),
            openai_model: Some(config.hosted_model_name.clone()),
            ollama_model: Some(config.local_model_name.clone()),
            ollama_url: Some(config.local_endpoint_url.clone()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
