//! Candidate and result types flowing through the pipeline.

use serde::{Deserialize, Serialize};

/// A parsed draft solution.
///
/// `raw` is the canonical re-serialization of `thought` and `answer` into the
/// THOUGHT/ANSWER template; every downstream stage operates on that single
/// normalized shape. Candidates are never mutated after construction,
/// refinement produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Step-by-step reasoning section
    pub thought: String,

    /// One-line conclusion section
    pub answer: String,

    /// Canonical template rendering of the two sections
    pub raw: String,
}

impl Candidate {
    /// Build a candidate from its two sections, reconstructing the canonical
    /// template form.
    pub fn new(thought: impl Into<String>, answer: impl Into<String>) -> Self {
        let thought = thought.into();
        let answer = answer.into();
        let raw = format!("THOUGHT:\n{thought}\n\nANSWER:\n{answer}");
        Self {
            thought,
            answer,
            raw,
        }
    }

    /// Terminal candidate returned when no draft could be produced at all.
    pub fn failure() -> Self {
        Self::new(
            "Error: No valid candidates generated.",
            "Please try again with a different prompt.",
        )
    }
}

/// Final output of a pipeline run.
///
/// Exactly one is produced per question; `rules` may be empty but is never
/// absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// The judged-best (or fallback) candidate
    pub best: Candidate,

    /// Heuristic rules extracted by the judge, in extraction order
    pub rules: Vec<String>,
}
