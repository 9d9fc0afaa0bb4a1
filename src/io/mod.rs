//! Export and import of analysis results.
//!
//! # Supported Formats
//!
//! | Format | Import | Export | Notes |
//! |--------|--------|--------|-------|
//! | JSON | ✓ | ✓ | Pretty `{"results": [...]}`; bare arrays accepted on import |
//! | YAML | ✓ | ✓ | `results:` sequence |
//! | CSV | ✓ | ✓ | `problem,solution` header |
//! | Markdown | - | ✓ | Numbered sections for reading |
//!
//! # Example
//!
//! ```rust,ignore
//! use threadkb::io::{export, Format};
//!
//! let text = export(&result, Format::Csv)?;
//! std::fs::write("results.csv", text)?;
//! ```

pub mod formats;

pub use formats::Format;

use crate::models::{AnalysisResult, ProblemSolution};
use crate::{Error, Result};

/// File name the results are saved under when the caller gives none.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "chat-analysis-results.json";

/// Encodes a successful result in `format`.
///
/// # Errors
///
/// Returns [`Error::Validation`] when `result` is an error result, or an
/// operation error if encoding fails.
pub fn export(result: &AnalysisResult, format: Format) -> Result<String> {
    let Some(results) = result.results() else {
        return Err(Error::Validation(format!(
            "Cannot export a failed analysis: {}",
            result.error().unwrap_or_default()
        )));
    };

    match format {
        Format::Json => formats::json::encode(results),
        Format::Yaml => formats::yaml::encode(results),
        Format::Csv => formats::csv::encode(results),
        Format::Markdown => Ok(formats::markdown::encode(results)),
    }
}

/// Decodes pairs previously written by [`export`].
///
/// # Errors
///
/// Returns [`Error::Validation`] for formats without import support or for
/// input that does not hold problem/solution pairs.
pub fn import(input: &str, format: Format) -> Result<Vec<ProblemSolution>> {
    match format {
        Format::Json => formats::json::decode(input),
        Format::Yaml => formats::yaml::decode(input),
        Format::Csv => formats::csv::decode(input),
        Format::Markdown => Err(Error::Validation(
            "Markdown exports cannot be imported".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysisResult {
        AnalysisResult::success(vec![
            ProblemSolution::new("App crashes on launch", "Reinstall the app"),
            ProblemSolution::new("Login fails", "Reset the password"),
        ])
    }

    #[test]
    fn test_export_json_matches_download_shape() {
        let text = export(&sample(), Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["results"][0]["problem"], "App crashes on launch");
        assert_eq!(value["results"][1]["solution"], "Reset the password");
        assert!(text.contains("\n  "), "expected pretty-printed output");
    }

    #[test]
    fn test_export_error_result_is_rejected() {
        let err = export(&AnalysisResult::failure("boom"), Format::Json).unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.contains("boom")));
    }

    #[test]
    fn test_import_markdown_is_rejected() {
        let text = export(&sample(), Format::Markdown).unwrap();
        assert!(matches!(
            import(&text, Format::Markdown),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_csv_round_trip_preserves_order() {
        let text = export(&sample(), Format::Csv).unwrap();
        let pairs = import(&text, Format::Csv).unwrap();
        assert_eq!(pairs, sample().into_results().unwrap());
    }

    #[test]
    fn test_default_file_name_is_json() {
        let path = std::path::Path::new(DEFAULT_EXPORT_FILE_NAME);
        assert_eq!(Format::from_path(path).unwrap(), Format::Json);
    }
}
