//! Free-text parsing of model completions into structured candidates.
//!
//! Completions are noisy: models wrap section labels in markdown emphasis,
//! swap THOUGHT for REASONING, or drop the labels entirely and emit bare
//! paragraphs. Parsing is an ordered list of pure strategies tried in
//! sequence; the first one to produce a candidate wins.

use crate::models::Candidate;
use regex::Regex;

/// Reasoning label, free text, conclusion label, free text to end-of-input.
const SECTION_PATTERN: &str =
    r"(?is)(?:THOUGHT|REASONING):\s*(.*?)\s*(?:ANSWER|CONCLUSION):\s*(.*)";

/// Normalized form of the critique sentinel meaning "nothing to fix".
pub const NO_ISSUE: &str = "NOISSUE";

/// Parse a completion into a candidate, or `None` when no strategy matches.
pub fn parse_candidate(text: &str) -> Option<Candidate> {
    let text = strip_markup(text.trim());
    labeled_sections(&text).or_else(|| paired_paragraphs(&text))
}

/// Remove lightweight emphasis markup the model may wrap labels in.
fn strip_markup(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '*' | '_' | '`'))
        .collect()
}

/// Strategy 1: explicit reasoning/conclusion labels anywhere in the text.
fn labeled_sections(text: &str) -> Option<Candidate> {
    let re = Regex::new(SECTION_PATTERN).ok()?;
    let captures = re.captures(text)?;
    candidate_from_spans(captures.get(1)?.as_str(), captures.get(2)?.as_str())
}

/// Strategy 2: adjacent blank-line-separated segments, relabeled as a
/// synthetic THOUGHT/ANSWER form and re-matched.
fn paired_paragraphs(text: &str) -> Option<Candidate> {
    let segments: Vec<&str> = text.split("\n\n").collect();
    segments.windows(2).find_map(|pair| {
        let synthetic = format!("THOUGHT: {}\nANSWER: {}", pair[0], pair[1]);
        labeled_sections(&synthetic)
    })
}

/// Collapse whitespace runs in both spans and reject empty sections.
fn candidate_from_spans(thought: &str, answer: &str) -> Option<Candidate> {
    let thought = collapse_whitespace(thought);
    let answer = collapse_whitespace(answer);
    if thought.is_empty() || answer.is_empty() {
        return None;
    }
    Some(Candidate::new(thought, answer))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a critique for comparison against the "no issues" sentinel:
/// every non-alphanumeric character is dropped and the rest uppercased.
pub fn normalize_critique(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_uppercase()
}
