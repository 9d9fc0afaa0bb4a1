//! JSON format adapter.

use crate::models::ProblemSolution;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct Document<'a> {
    results: &'a [ProblemSolution],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Input {
    Wrapped { results: Vec<ProblemSolution> },
    Bare(Vec<ProblemSolution>),
}

/// Encodes pairs as pretty-printed `{"results": [...]}`.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode(results: &[ProblemSolution]) -> Result<String> {
    serde_json::to_string_pretty(&Document { results }).map_err(|e| Error::OperationFailed {
        operation: "write_json".to_string(),
        cause: e.to_string(),
    })
}

/// Decodes a `{"results": [...]}` document or a bare array of pairs.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the input is not one of those shapes.
pub fn decode(input: &str) -> Result<Vec<ProblemSolution>> {
    let parsed: Input = serde_json::from_str(input)
        .map_err(|e| Error::Validation(format!("Failed to parse JSON results: {e}")))?;

    Ok(match parsed {
        Input::Wrapped { results } | Input::Bare(results) => results,
    })
}
