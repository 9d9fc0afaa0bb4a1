//! Markdown listing for reading results.

use crate::models::ProblemSolution;
use std::fmt::Write;

/// Renders pairs as numbered `## Problem N` sections.
#[must_use]
pub fn encode(results: &[ProblemSolution]) -> String {
    let mut out = String::from("# Chat Analysis Results\n");

    if results.is_empty() {
        out.push_str("\n_No problems or solutions were identified in the chat thread._\n");
        return out;
    }

    for (i, pair) in results.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = write!(
            out,
            "\n## Problem {}\n\n{}\n\n**Solution:** {}\n",
            i + 1,
            pair.problem,
            pair.solution
        );
    }
    out
}
