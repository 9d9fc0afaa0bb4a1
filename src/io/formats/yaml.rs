//! YAML format adapter.

use crate::models::ProblemSolution;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    results: Vec<ProblemSolution>,
}

/// Encodes pairs as a mapping with a `results` sequence.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode(results: &[ProblemSolution]) -> Result<String> {
    let document = Document {
        results: results.to_vec(),
    };
    serde_yaml_ng::to_string(&document).map_err(|e| Error::OperationFailed {
        operation: "write_yaml".to_string(),
        cause: e.to_string(),
    })
}

/// Decodes a YAML document written by [`encode`].
///
/// Blank input yields no pairs.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the document cannot be parsed.
pub fn decode(input: &str) -> Result<Vec<ProblemSolution>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: Document = serde_yaml_ng::from_str(input)
        .map_err(|e| Error::Validation(format!("Failed to parse YAML results: {e}")))?;
    Ok(document.results)
}
