//! Terminal rendering of analysis results.

use crate::models::ProblemSolution;
use std::fmt::Write;

/// Message shown when the model found nothing.
pub const EMPTY_RESULTS_MESSAGE: &str =
    "No problems or solutions were identified in the chat thread.";

/// Number of problem characters shown per line before truncating.
pub const SUMMARY_PREVIEW_CHARS: usize = 60;

/// Produces a one-line-per-problem listing.
///
/// Each line reads `Problem N: <preview>`, where the preview is cut to
/// [`SUMMARY_PREVIEW_CHARS`] characters and suffixed with `...` when longer.
#[must_use]
pub fn summarize(results: &[ProblemSolution]) -> String {
    if results.is_empty() {
        return EMPTY_RESULTS_MESSAGE.to_string();
    }

    let mut out = String::new();
    for (i, pair) in results.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "Problem {}: {}", i + 1, preview(&pair.problem));
    }
    out
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(SUMMARY_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
