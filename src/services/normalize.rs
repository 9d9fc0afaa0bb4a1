//! Model output normalization.
//!
//! Providers are asked for different top-level shapes; this is the only place
//! that reconciles them. Resolution order:
//!
//! 1. An object's `results` field.
//! 2. A bare top-level array.
//! 3. An object's single array-valued field (JSON-object mode often wraps the
//!    requested array under a key of the model's choosing).
//! 4. Otherwise, no entries.

use crate::models::ProblemSolution;
use crate::{Error, Result};
use serde_json::{Map, Value};

/// Parses raw model output into ordered problem/solution pairs.
///
/// # Errors
///
/// Returns [`Error::Parse`] if `raw` is not valid JSON, or if any resolved
/// entry is not an object with string `problem` and `solution` fields.
pub fn normalize(raw: &str) -> Result<Vec<ProblemSolution>> {
    let value: Value = serde_json::from_str(raw).map_err(|e| {
        tracing::debug!(error = %e, raw, "Model output is not valid JSON");
        Error::Parse("model output is not valid JSON".to_string())
    })?;

    let Some(entries) = resolve_entries(&value) else {
        tracing::debug!("Model output has no entry array, returning empty result");
        return Ok(Vec::new());
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_entry(index, entry))
        .collect()
}

/// Finds the entry array inside a parsed model response.
fn resolve_entries(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(entries) => Some(entries),
        Value::Object(map) => map
            .get("results")
            .map_or_else(|| sole_array_field(map), Value::as_array),
        _ => None,
    }
}

fn sole_array_field(map: &Map<String, Value>) -> Option<&Vec<Value>> {
    let mut arrays = map.values().filter_map(Value::as_array);
    match (arrays.next(), arrays.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

/// Validates one entry. Positions in messages are 1-based.
fn parse_entry(index: usize, entry: &Value) -> Result<ProblemSolution> {
    let position = index + 1;
    let Some(object) = entry.as_object() else {
        return Err(Error::Parse(format!("entry {position} is not an object")));
    };

    let field = |name: &str| -> Result<String> {
        object
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                Error::Parse(format!(
                    "entry {position} is missing string field '{name}'"
                ))
            })
    };

    Ok(ProblemSolution {
        problem: field("problem")?,
        solution: field("solution")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_field() {
        let pairs = normalize(r#"{"results":[{"problem":"P1","solution":"S1"}]}"#).unwrap();
        assert_eq!(pairs, vec![ProblemSolution::new("P1", "S1")]);
    }

    #[test]
    fn test_bare_array_preserves_order() {
        let raw = r#"[
            {"problem": "first", "solution": "a"},
            {"problem": "second", "solution": "b"},
            {"problem": "third", "solution": "c"}
        ]"#;
        let pairs = normalize(raw).unwrap();
        let problems: Vec<&str> = pairs.iter().map(|p| p.problem.as_str()).collect();
        assert_eq!(problems, ["first", "second", "third"]);
    }

    #[test]
    fn test_sole_array_field_is_used() {
        let raw = r#"{"problems": [{"problem": "P", "solution": "S"}], "count": 1}"#;
        assert_eq!(normalize(raw).unwrap(), vec![ProblemSolution::new("P", "S")]);
    }

    #[test]
    fn test_ambiguous_object_is_empty() {
        let raw = r#"{"a": [{"problem": "P", "solution": "S"}], "b": []}"#;
        assert!(normalize(raw).unwrap().is_empty());
    }

    #[test]
    fn test_results_wins_over_other_arrays() {
        let raw = r#"{"notes": [1, 2], "results": [{"problem": "P", "solution": "S"}]}"#;
        assert_eq!(normalize(raw).unwrap().len(), 1);
    }

    #[test]
    fn test_non_array_shapes_are_empty() {
        assert!(normalize(r#"{"results": null}"#).unwrap().is_empty());
        assert!(normalize(r#"{"summary": "nothing here"}"#).unwrap().is_empty());
        assert!(normalize("42").unwrap().is_empty());
        assert!(normalize(r#""text""#).unwrap().is_empty());
    }

    #[test]
    fn test_not_json_is_parse_error() {
        let err = normalize("not json").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_not_json_message_omits_decoder_detail() {
        let err = normalize("{\"results\": [oops]}").unwrap_err();
        let message = err.to_string();
        assert_eq!(message, "failed to parse analysis results: model output is not valid JSON");
        assert!(!message.contains("line"));
        assert!(!message.contains("column"));
    }

    #[test]
    fn test_markdown_fenced_json_is_rejected() {
        let raw = "```json\n{\"results\": []}\n```";
        assert!(matches!(normalize(raw), Err(Error::Parse(_))));
    }

    #[test]
    fn test_missing_solution_is_parse_error() {
        let raw = r#"{"results": [{"problem": "P1", "solution": "S1"}, {"problem": "P2"}]}"#;
        let err = normalize(raw).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().contains("entry 2"));
        assert!(err.to_string().contains("'solution'"));
    }

    #[test]
    fn test_non_string_field_is_parse_error() {
        let raw = r#"[{"problem": 7, "solution": "S"}]"#;
        assert!(matches!(normalize(raw), Err(Error::Parse(_))));
    }

    #[test]
    fn test_non_object_entry_is_parse_error() {
        let err = normalize(r#"["just a string"]"#).unwrap_err();
        assert!(err.to_string().contains("entry 1 is not an object"));
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let raw = r#"[{"problem": "P", "solution": "S", "confidence": 0.9}]"#;
        assert_eq!(normalize(raw).unwrap(), vec![ProblemSolution::new("P", "S")]);
    }
}
