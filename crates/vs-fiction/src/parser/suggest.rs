//! Nearest-command suggestions with fuzzy matching.

use strsim::jaro_winkler;

use super::command::all_prefixes;

/// Minimum similarity score for fuzzy matching (0.0-1.0).
const FUZZY_THRESHOLD: f64 = 0.8;

/// Score every command prefix against the input.
///
/// Returns `(prefix, score)` pairs above `threshold`, best first.
pub fn fuzzy_match(input: &str, threshold: f64) -> Vec<(&'static str, f64)> {
    let input_lower = input.to_lowercase();
    let mut matches: Vec<(&'static str, f64)> = all_prefixes()
        .filter_map(|prefix| {
            let score = jaro_winkler(&input_lower, prefix);
            (score >= threshold).then_some((prefix, score))
        })
        .collect();

    matches.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    matches
}

/// The closest command prefix to a misspelled verb, if any is close enough.
pub fn suggest_prefix(verb: &str) -> Option<&'static str> {
    fuzzy_match(verb, FUZZY_THRESHOLD)
        .first()
        .map(|(prefix, _)| *prefix)
}
