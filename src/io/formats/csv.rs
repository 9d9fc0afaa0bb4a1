//! CSV format adapter.
//!
//! Columns are located by header name, so extra columns and reordering are
//! tolerated on import.

use crate::models::ProblemSolution;
use crate::{Error, Result};

const HEADERS: [&str; 2] = ["problem", "solution"];

/// Encodes pairs as CSV with a `problem,solution` header.
///
/// # Errors
///
/// Returns an error if writing a record fails.
pub fn encode(results: &[ProblemSolution]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(HEADERS).map_err(write_error)?;
    for pair in results {
        writer
            .write_record([pair.problem.as_str(), pair.solution.as_str()])
            .map_err(write_error)?;
    }

    let bytes = writer.into_inner().map_err(|e| Error::OperationFailed {
        operation: "write_csv".to_string(),
        cause: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| Error::OperationFailed {
        operation: "write_csv".to_string(),
        cause: e.to_string(),
    })
}

/// Decodes CSV with `problem` and `solution` columns.
///
/// # Errors
///
/// Returns [`Error::Validation`] if either column is missing or a row cannot
/// be read.
pub fn decode(input: &str) -> Result<Vec<ProblemSolution>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::Validation(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::Validation(format!("CSV must have a '{name}' column")))
    };
    let problem_idx = column("problem")?;
    let solution_idx = column("solution")?;

    let mut results = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| Error::Validation(format!("Row {}: {e}", row + 1)))?;
        let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();
        results.push(ProblemSolution {
            problem: field(problem_idx),
            solution: field(solution_idx),
        });
    }

    Ok(results)
}

#[allow(clippy::needless_pass_by_value)]
fn write_error(e: csv::Error) -> Error {
    Error::OperationFailed {
        operation: "write_csv".to_string(),
        cause: e.to_string(),
    }
}
