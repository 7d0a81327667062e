//! Semantic consistency verification of a candidate's answer.

use crate::client::{CallKind, ChatTransport, Message};
use crate::models::Result;
use crate::prompts;
use std::sync::Arc;

/// Phrases marking a question as a truth-assessment task.
const TRUTH_ASSESSMENT_PHRASES: [&str; 9] = [
    "prove",
    "show",
    "is it true",
    "true or false",
    "determine whether",
    "verify",
    "check if",
    "confirm",
    "validate",
];

/// Checks whether an answer actually addresses the original question.
pub struct ConsistencyChecker {
    transport: Arc<dyn ChatTransport>,
}

impl ConsistencyChecker {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self { transport }
    }

    /// Ask the remote service whether `answer` addresses `question`.
    ///
    /// Returns the verdict and the verbatim explanation. Transport failures
    /// propagate to the caller, which treats them as a failed verification
    /// for that candidate.
    pub async fn check(&self, question: &str, answer: &str) -> Result<(bool, String)> {
        let truth_assessment = is_truth_assessment(question);
        let messages = vec![
            Message::system(prompts::CONSISTENCY_SYS),
            Message::user(prompts::consistency_user(question, answer, truth_assessment)),
        ];

        let response = self
            .transport
            .complete(CallKind::Consistency, messages, 0.1, 64)
            .await?;

        let is_consistent = response.trim().to_uppercase().starts_with("YES");
        Ok((is_consistent, response))
    }
}

/// A question is a truth-assessment task when it contains any of the fixed
/// phrases, case-insensitively.
fn is_truth_assessment(question: &str) -> bool {
    let question = question.to_lowercase();
    TRUTH_ASSESSMENT_PHRASES
        .iter()
        .any(|phrase| question.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truth_assessment_phrases_match_case_insensitively() {
        assert!(is_truth_assessment("Prove that 17 is prime"));
        assert!(is_truth_assessment("TRUE OR FALSE: the sum is even"));
        assert!(is_truth_assessment("Determine whether n divides m"));
    }

    #[test]
    fn test_plain_questions_are_not_truth_assessment() {
        assert!(!is_truth_assessment("What is the capital of France?"));
        assert!(!is_truth_assessment("Compute 2 + 2"));
    }
}
