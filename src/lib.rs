//! # threadkb
//!
//! Turns chat transcripts into knowledge-base entries.
//!
//! A transcript is handed to one of two interchangeable LLM backends (a hosted
//! chat-completion API or a local Ollama-style `generate` endpoint). The
//! model's JSON output is normalized into an ordered list of
//! [`ProblemSolution`] pairs, which can be served over HTTP or exported.
//!
//! ## Example
//!
//! ```rust,ignore
//! use threadkb::{AnalysisService, AppConfig};
//!
//! let service = AnalysisService::from_config(&AppConfig::load(None)?);
//! let result = service.handle(Some("user: it crashes\nagent: update it"), None).await?;
//! for pair in result.results().unwrap_or_default() {
//!     println!("{} -> {}", pair.problem, pair.solution);
//! }
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive dependencies).
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod io;
pub mod llm;
pub mod models;
pub mod observability;
pub mod rendering;
pub mod server;
pub mod services;

pub use config::AppConfig;
pub use llm::{Credentials, Invoker, LlmProvider};
pub use models::{AnalysisResult, AnalyzeRequest, ModelConfig, ProblemSolution, Provider};
pub use services::AnalysisService;

/// Error type for threadkb operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When | HTTP status |
/// |---------|-------------|-------------|
/// | `Validation` | Blank chat text, unknown provider, malformed request body | 400 |
/// | `Provider` | Upstream LLM call fails, returns non-2xx, or returns no content | 500 |
/// | `Parse` | Model output is not JSON or an entry lacks `problem`/`solution` | 500 |
/// | `OperationFailed` | Config loading, file I/O, server startup | 500 |
#[derive(Debug, ThisError)]
pub enum Error {
    /// The caller supplied bad or missing input.
    ///
    /// The message is shown to the caller verbatim.
    #[error("{0}")]
    Validation(String),

    /// The LLM provider call failed.
    ///
    /// Raised when:
    /// - The HTTP request cannot be sent (connect, DNS, TLS)
    /// - The provider answers with a non-success status
    /// - The response carries no content
    /// - The hosted provider has no API key
    #[error("{provider} request failed: {cause}")]
    Provider {
        /// Provider name (`openai` or `ollama`).
        provider: &'static str,
        /// Short description of the failure.
        cause: String,
    },

    /// The model output could not be turned into problem/solution pairs.
    #[error("failed to parse analysis results: {0}")]
    Parse(String),

    /// A non-request operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Returns true when the error is the caller's fault.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Short label used for metrics and log fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Provider { .. } => "provider",
            Self::Parse(_) => "parse",
            Self::OperationFailed { .. } => "operation",
        }
    }
}

/// Result type alias for threadkb operations.
pub type Result<T> = std::result::Result<T, Error>;
