//! Analysis request and result types.

use super::ModelConfigInput;
use serde::{Deserialize, Serialize};

/// One extracted knowledge-base entry.
///
/// Entries have no identity beyond their position in the result list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProblemSolution {
    /// The problem raised in the conversation.
    pub problem: String,
    /// How the problem was resolved.
    pub solution: String,
}

impl ProblemSolution {
    /// Creates a new pair.
    #[must_use]
    pub fn new(problem: impl Into<String>, solution: impl Into<String>) -> Self {
        Self {
            problem: problem.into(),
            solution: solution.into(),
        }
    }
}

/// Outcome of an analysis, as carried over the wire.
///
/// Serializes to either `{"results": [...]}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    /// Extracted pairs in model output order.
    Results {
        /// The pairs.
        results: Vec<ProblemSolution>,
    },
    /// The analysis failed.
    Error {
        /// Caller-facing message.
        error: String,
    },
}

impl AnalysisResult {
    /// Wraps a successful sequence.
    #[must_use]
    pub const fn success(results: Vec<ProblemSolution>) -> Self {
        Self::Results { results }
    }

    /// Wraps a failure message.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
        }
    }

    /// Returns the pairs for a successful result.
    #[must_use]
    pub fn results(&self) -> Option<&[ProblemSolution]> {
        match self {
            Self::Results { results } => Some(results),
            Self::Error { .. } => None,
        }
    }

    /// Returns the message for a failed result.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Results { .. } => None,
            Self::Error { error } => Some(error),
        }
    }

    /// Returns true for a successful result.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Results { .. })
    }

    /// Consumes the result, returning the pairs if successful.
    #[must_use]
    pub fn into_results(self) -> Option<Vec<ProblemSolution>> {
        match self {
            Self::Results { results } => Some(results),
            Self::Error { .. } => None,
        }
    }
}

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// The pasted transcript.
    #[serde(default)]
    pub chat_text: Option<String>,
    /// Optional model configuration; server defaults apply when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_config: Option<ModelConfigInput>,
}

impl AnalyzeRequest {
    /// Creates a request for `chat_text` using the server defaults.
    #[must_use]
    pub fn new(chat_text: impl Into<String>) -> Self {
        Self {
            chat_text: Some(chat_text.into()),
            model_config: None,
        }
    }

    /// Sets the model configuration.
    #[must_use]
    pub fn with_model_config(mut self, config: ModelConfigInput) -> Self {
        self.model_config = Some(config);
        self
    }
}
