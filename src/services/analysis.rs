//! The analysis request handler.

use super::normalize;
use crate::config::AppConfig;
use crate::llm::{Credentials, Invoker, LlmProvider, ProviderSettings};
use crate::models::{AnalysisResult, AnalyzeRequest, ModelConfig, ModelConfigInput};
use crate::observability::{RequestContext, current_request_id, record_analysis};
use crate::{Error, Result};
use std::time::Instant;
use tracing::Instrument;

/// Runs one chat transcript through a provider and the normalizer.
///
/// The service holds only read-only state, so one instance is shared by every
/// request.
#[derive(Debug, Clone)]
pub struct AnalysisService {
    defaults: ModelConfig,
    credentials: Credentials,
    providers: ProviderSettings,
    client: reqwest::Client,
}

impl AnalysisService {
    /// Creates a service with the given defaults and credentials.
    #[must_use]
    pub fn new(defaults: ModelConfig, credentials: Credentials, providers: ProviderSettings) -> Self {
        Self {
            defaults,
            credentials,
            providers,
            client: reqwest::Client::new(),
        }
    }

    /// Creates a service from application configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.model.clone(),
            config.credentials.clone(),
            config.providers.clone(),
        )
    }

    /// Sets the HTTP client shared by all provider calls.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// The model configuration used when a request carries none.
    #[must_use]
    pub const fn defaults(&self) -> &ModelConfig {
        &self.defaults
    }

    /// Handles a decoded request body.
    ///
    /// # Errors
    ///
    /// See [`Self::handle`].
    pub async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalysisResult> {
        self.handle(request.chat_text.as_deref(), request.model_config)
            .await
    }

    /// Validates the input, invokes the selected provider and normalizes its
    /// output.
    ///
    /// The chat text is checked before the provider is resolved, so blank text
    /// is rejected even when the provider name is also bad.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] when `chat_text` is missing or blank, or the
    ///   provider is not recognized.
    /// - [`Error::Provider`] when the provider call fails.
    /// - [`Error::Parse`] when the model output cannot be normalized.
    pub async fn handle(
        &self,
        chat_text: Option<&str>,
        config: Option<ModelConfigInput>,
    ) -> Result<AnalysisResult> {
        let start = Instant::now();

        let (chat_text, config) = match self.validate(chat_text, config) {
            Ok(validated) => validated,
            Err(e) => {
                tracing::debug!(error = %e, "rejected analysis request");
                record_analysis("none", e.kind(), start.elapsed());
                return Err(e);
            },
        };

        let request_id =
            current_request_id().unwrap_or_else(|| RequestContext::new().request_id().to_string());
        let invoker = Invoker::select(&config, &self.credentials, &self.providers, &self.client);
        let provider = invoker.name();
        let span = tracing::info_span!(
            "analysis",
            request_id = %request_id,
            provider,
            model = invoker.model(),
        );

        let outcome = async {
            tracing::info!(chars = chat_text.chars().count(), "analyzing chat thread");
            let raw = invoker.invoke(chat_text).await?;
            tracing::debug!(bytes = raw.len(), "received model output");

            let results = normalize(&raw).inspect_err(|e| {
                tracing::error!(error = %e, "model output could not be normalized");
                tracing::debug!(raw = %raw, "unnormalized model output");
            })?;
            tracing::info!(count = results.len(), "analysis complete");
            Ok::<_, Error>(AnalysisResult::success(results))
        }
        .instrument(span)
        .await;

        let label = match &outcome {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        record_analysis(provider, label, start.elapsed());
        outcome
    }

    fn validate<'a>(
        &self,
        chat_text: Option<&'a str>,
        config: Option<ModelConfigInput>,
    ) -> Result<(&'a str, ModelConfig)> {
        let chat_text = chat_text
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| Error::Validation("Chat text is required".to_string()))?;

        let config = match config {
            Some(input) => input.resolve(&self.defaults)?,
            None => self.defaults.clone(),
        };
        Ok((chat_text, config))
    }
}
