//! Property-based tests for export round-trips and input validation.
//!
//! Uses proptest to verify invariants across random inputs:
//! - JSON, YAML and CSV exports import back to the same pairs in order
//! - Blank chat text is rejected whatever the provider
//! - The normalizer never panics on arbitrary text

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use threadkb::io::{Format, export, import};
use threadkb::llm::ProviderSettings;
use threadkb::models::ModelConfigInput;
use threadkb::rendering::summarize;
use threadkb::services::normalize;
use threadkb::{AnalysisResult, AnalysisService, Credentials, Error, ModelConfig, ProblemSolution};

fn pair_strategy() -> impl Strategy<Value = ProblemSolution> {
    (
        "[a-zA-Z0-9 ,.;:?!'\"()-]{0,80}",
        "[a-zA-Z0-9 ,.;:?!'\"()-]{0,80}",
    )
        .prop_map(|(problem, solution)| ProblemSolution::new(problem, solution))
}

fn pairs_strategy() -> impl Strategy<Value = Vec<ProblemSolution>> {
    prop::collection::vec(pair_strategy(), 0..8)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// ============================================================================
// Export round-trips
// ============================================================================

proptest! {
    /// Property: JSON export imports back unchanged.
    #[test]
    fn prop_json_round_trip(pairs in pairs_strategy()) {
        let text = export(&AnalysisResult::success(pairs.clone()), Format::Json).unwrap();
        prop_assert_eq!(import(&text, Format::Json).unwrap(), pairs);
    }

    /// Property: YAML export imports back unchanged.
    #[test]
    fn prop_yaml_round_trip(pairs in pairs_strategy()) {
        let text = export(&AnalysisResult::success(pairs.clone()), Format::Yaml).unwrap();
        prop_assert_eq!(import(&text, Format::Yaml).unwrap(), pairs);
    }

    /// Property: CSV export imports back unchanged.
    #[test]
    fn prop_csv_round_trip(pairs in pairs_strategy()) {
        let text = export(&AnalysisResult::success(pairs.clone()), Format::Csv).unwrap();
        prop_assert_eq!(import(&text, Format::Csv).unwrap(), pairs);
    }

    /// Property: a JSON export is also valid model output for the normalizer.
    #[test]
    fn prop_json_export_normalizes(pairs in pairs_strategy()) {
        let text = export(&AnalysisResult::success(pairs.clone()), Format::Json).unwrap();
        prop_assert_eq!(normalize(&text).unwrap(), pairs);
    }

    /// Property: the summary has one line per pair.
    #[test]
    fn prop_summary_line_count(pairs in prop::collection::vec(pair_strategy(), 1..8)) {
        prop_assert_eq!(summarize(&pairs).lines().count(), pairs.len());
    }
}

// ============================================================================
// Validation
// ============================================================================

proptest! {
    /// Property: whitespace-only chat text is rejected for every provider.
    #[test]
    fn prop_blank_text_rejected(
        blank in "[ \t\r\n]{0,20}",
        provider in prop::sample::select(vec!["openai", "ollama", "unknown", ""]),
    ) {
        let service = AnalysisService::new(
            ModelConfig::default(),
            Credentials::new(),
            ProviderSettings::default(),
        );
        let config = ModelConfigInput {
            provider: Some(provider.to_string()),
            ..ModelConfigInput::default()
        };

        let err = runtime()
            .block_on(service.handle(Some(&blank), Some(config)))
            .unwrap_err();
        prop_assert!(matches!(err, Error::Validation(_)));
    }

    /// Property: the normalizer returns a result or an error for any text.
    #[test]
    fn prop_normalize_total(raw in ".{0,200}") {
        match normalize(&raw) {
            Ok(_) | Err(Error::Parse(_)) => {},
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }
}
