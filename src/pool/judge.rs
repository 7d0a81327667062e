//! Judged selection and rule extraction.

use crate::client::{CallKind, ChatTransport, Message};
use crate::models::{Candidate, Result};
use crate::prompts;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, warn};

/// Prefix marking an extracted heuristic line in the judge's verdict.
const RULE_PREFIX: &str = "RULE:";

/// Picks the best candidate and extracts generalized heuristics.
pub struct Judge {
    transport: Arc<dyn ChatTransport>,
}

impl Judge {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self { transport }
    }

    /// Judge a non-empty candidate list. Returns the selected index (always
    /// in bounds) and the rules in extraction order, duplicates kept.
    pub async fn judge(&self, candidates: &[Candidate]) -> Result<(usize, Vec<String>)> {
        debug!(count = candidates.len(), "judging candidates");

        let listing = render_candidates(candidates);
        let messages = vec![
            Message::system(prompts::JUDGE_SYS),
            Message::user(prompts::judge_user(&listing)),
        ];

        let verdict = self
            .transport
            .complete(CallKind::Judgment, messages, 0.1, 256)
            .await?;
        debug!(verdict = %verdict, "judge verdict");

        Ok(extract_verdict(&verdict, candidates.len()))
    }
}

/// Label candidates with consecutive letters and join their canonical forms.
fn render_candidates(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .enumerate()
        .map(|(i, candidate)| format!("{}. {}", letter_for(i), candidate.raw))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn letter_for(index: usize) -> char {
    (b'A' as usize + index) as u8 as char
}

/// Scan a verdict for the chosen letter and RULE lines. A missing or
/// out-of-range verdict falls back to the first candidate with no rules.
fn extract_verdict(verdict: &str, candidate_count: usize) -> (usize, Vec<String>) {
    let best = Regex::new(r"Best:\s*([A-Z])").ok().and_then(|re| {
        let captures = re.captures(verdict)?;
        captures.get(1)?.as_str().chars().next()
    });

    let Some(letter) = best else {
        warn!("no best candidate in verdict, using first candidate");
        return (0, Vec::new());
    };

    let index = (letter as usize) - ('A' as usize);
    if index >= candidate_count {
        warn!(index, "candidate index out of range, using first candidate");
        return (0, Vec::new());
    }

    let rules = verdict
        .lines()
        .filter_map(|line| line.strip_prefix(RULE_PREFIX))
        .map(|rule| rule.trim().to_string())
        .collect();

    (index, rules)
}
