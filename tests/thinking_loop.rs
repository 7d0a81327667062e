//! End-to-end pipeline scenarios over a scripted transport.
//!
//! `max_workers` is pinned to 1 so tasks drain their scripted replies in
//! submission order on the single-threaded test runtime.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use thinker::{
    Candidate, CallKind, ChatTransport, Config, Message, ThinkerError, ThinkingPipeline,
};

/// Transport that replays canned responses per call kind, in order. An
/// exhausted queue produces a transport error, which doubles as the error
/// injection for failure-path tests.
struct ScriptedTransport {
    responses: Mutex<HashMap<CallKind, VecDeque<String>>>,
    calls: Mutex<Vec<CallKind>>,
}

impl ScriptedTransport {
    fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn script(self, kind: CallKind, replies: &[&str]) -> Self {
        {
            let mut responses = self.responses.lock().unwrap();
            let queue = responses.entry(kind).or_default();
            queue.extend(replies.iter().map(|reply| reply.to_string()));
        }
        self
    }

    fn calls_of(&self, kind: CallKind) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|recorded| **recorded == kind)
            .count()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn complete(
        &self,
        kind: CallKind,
        _messages: Vec<Message>,
        _temperature: f64,
        _max_tokens: u32,
    ) -> thinker::Result<String> {
        self.calls.lock().unwrap().push(kind);
        let reply = self
            .responses
            .lock()
            .unwrap()
            .get_mut(&kind)
            .and_then(|queue| queue.pop_front());
        reply.ok_or(ThinkerError::Api {
            status: 503,
            message: format!("no scripted reply for {kind}"),
        })
    }
}

fn test_config(candidate_count: usize) -> Config {
    Config {
        candidate_count,
        max_workers: 1,
        ..Config::default()
    }
}

fn pipeline_over(config: &Config, transport: &Arc<ScriptedTransport>) -> ThinkingPipeline {
    let transport: Arc<dyn ChatTransport> = transport.clone();
    ThinkingPipeline::with_transport(config, transport)
}

const GIBBERISH: &str = "zzz qqq entirely unstructured output";

#[tokio::test]
async fn test_happy_path_selects_judged_best_with_rules() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .script(
                CallKind::Generation,
                &[
                    "THOUGHT:\nalpha reasoning\n\nANSWER:\nalpha answer",
                    "THOUGHT:\nbeta reasoning\n\nANSWER:\nbeta answer",
                    "THOUGHT:\ngamma reasoning\n\nANSWER:\ngamma answer",
                ],
            )
            .script(
                CallKind::Consistency,
                &["YES - addresses it", "YES - addresses it", "YES - addresses it"],
            )
            .script(CallKind::Critique, &["NO ISSUE", "NO ISSUE", "NO ISSUE"])
            .script(
                CallKind::Judgment,
                &["Best: B\nRULE: Verify each step independently.\nRULE: State the conclusion plainly."],
            ),
    );
    let config = test_config(3);

    let result = pipeline_over(&config, &transport).run("Compute the sum").await;

    assert_eq!(result.best, Candidate::new("beta reasoning", "beta answer"));
    assert_eq!(
        result.rules,
        vec![
            "Verify each step independently.",
            "State the conclusion plainly."
        ]
    );
    assert_eq!(transport.calls_of(CallKind::Generation), 3);
    assert_eq!(transport.calls_of(CallKind::Consistency), 3);
    assert_eq!(transport.calls_of(CallKind::Critique), 3);
    assert_eq!(transport.calls_of(CallKind::Refinement), 0);
    assert_eq!(transport.calls_of(CallKind::Judgment), 1);
}

#[tokio::test]
async fn test_no_issue_critique_keeps_candidate_identical() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .script(
                CallKind::Generation,
                &["THOUGHT:\noriginal reasoning\n\nANSWER:\noriginal answer"],
            )
            .script(CallKind::Consistency, &["YES"])
            .script(CallKind::Critique, &["No-Issue!!"])
            .script(CallKind::Judgment, &["Best: A"]),
    );
    let config = test_config(1);

    let result = pipeline_over(&config, &transport).run("q").await;

    assert_eq!(
        result.best,
        Candidate::new("original reasoning", "original answer")
    );
    assert_eq!(transport.calls_of(CallKind::Refinement), 0);
}

#[tokio::test]
async fn test_critique_with_issues_triggers_single_refinement() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .script(
                CallKind::Generation,
                &["THOUGHT:\noriginal reasoning\n\nANSWER:\noriginal answer"],
            )
            .script(CallKind::Consistency, &["YES"])
            .script(CallKind::Critique, &["Step 2 contradicts step 1."])
            .script(
                CallKind::Refinement,
                &["THOUGHT:\nrefined reasoning\n\nANSWER:\nrefined answer"],
            )
            .script(CallKind::Judgment, &["Best: A"]),
    );
    let config = test_config(1);

    let result = pipeline_over(&config, &transport).run("q").await;

    assert_eq!(
        result.best,
        Candidate::new("refined reasoning", "refined answer")
    );
    assert_eq!(transport.calls_of(CallKind::Refinement), 1);
}

#[tokio::test]
async fn test_unparsable_refinement_keeps_original() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .script(
                CallKind::Generation,
                &["THOUGHT:\noriginal reasoning\n\nANSWER:\noriginal answer"],
            )
            .script(CallKind::Consistency, &["YES"])
            .script(CallKind::Critique, &["The conclusion is unsupported."])
            .script(CallKind::Refinement, &[GIBBERISH])
            .script(CallKind::Judgment, &["Best: A"]),
    );
    let config = test_config(1);

    let result = pipeline_over(&config, &transport).run("q").await;

    assert_eq!(
        result.best,
        Candidate::new("original reasoning", "original answer")
    );
}

#[tokio::test]
async fn test_zero_refine_budget_skips_refinement() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .script(
                CallKind::Generation,
                &["THOUGHT:\noriginal reasoning\n\nANSWER:\noriginal answer"],
            )
            .script(CallKind::Consistency, &["YES"])
            .script(CallKind::Critique, &["Step 3 is a leap."])
            .script(CallKind::Judgment, &["Best: A"]),
    );
    let config = Config {
        max_refine_rounds: 0,
        ..test_config(1)
    };

    let result = pipeline_over(&config, &transport).run("q").await;

    assert_eq!(
        result.best,
        Candidate::new("original reasoning", "original answer")
    );
    assert_eq!(transport.calls_of(CallKind::Refinement), 0);
}

#[tokio::test]
async fn test_critique_transport_error_keeps_original() {
    // No critique scripted: the critique call errors and the candidate
    // passes through unchanged.
    let transport = Arc::new(
        ScriptedTransport::new()
            .script(
                CallKind::Generation,
                &["THOUGHT:\noriginal reasoning\n\nANSWER:\noriginal answer"],
            )
            .script(CallKind::Consistency, &["YES"])
            .script(CallKind::Judgment, &["Best: A"]),
    );
    let config = test_config(1);

    let result = pipeline_over(&config, &transport).run("q").await;

    assert_eq!(
        result.best,
        Candidate::new("original reasoning", "original answer")
    );
    assert_eq!(transport.calls_of(CallKind::Refinement), 0);
}

#[tokio::test]
async fn test_inconsistent_candidates_are_dropped() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .script(
                CallKind::Generation,
                &[
                    "THOUGHT:\nkept reasoning\n\nANSWER:\nkept answer",
                    "THOUGHT:\ndropped reasoning\n\nANSWER:\ndropped answer",
                ],
            )
            .script(CallKind::Consistency, &["YES - fine", "NO - off topic"])
            .script(CallKind::Critique, &["NO ISSUE"])
            .script(CallKind::Judgment, &["Best: A"]),
    );
    let config = test_config(2);

    let result = pipeline_over(&config, &transport).run("q").await;

    assert_eq!(result.best, Candidate::new("kept reasoning", "kept answer"));
    assert_eq!(transport.calls_of(CallKind::Critique), 1);
}

#[tokio::test]
async fn test_empty_generation_falls_back_to_single_shot() {
    let transport = Arc::new(ScriptedTransport::new().script(
        CallKind::Generation,
        &[
            GIBBERISH,
            GIBBERISH,
            "THOUGHT:\nfallback reasoning\n\nANSWER:\nfallback answer",
        ],
    ));
    let config = test_config(2);

    let result = pipeline_over(&config, &transport).run("q").await;

    assert_eq!(
        result.best,
        Candidate::new("fallback reasoning", "fallback answer")
    );
    assert!(result.rules.is_empty());
    assert_eq!(transport.calls_of(CallKind::Generation), 3);
    assert_eq!(transport.calls_of(CallKind::Consistency), 0);
    assert_eq!(transport.calls_of(CallKind::Judgment), 0);
}

#[tokio::test]
async fn test_all_gibberish_yields_synthetic_failure() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .script(CallKind::Generation, &[GIBBERISH, GIBBERISH, GIBBERISH, GIBBERISH]),
    );
    let config = test_config(3);

    let result = pipeline_over(&config, &transport).run("q").await;

    assert_eq!(result.best, Candidate::failure());
    assert!(result.rules.is_empty());
    assert!(!result.best.thought.is_empty());
    assert!(!result.best.answer.is_empty());
}

#[tokio::test]
async fn test_fallback_transport_error_yields_synthetic_failure() {
    // Two generation attempts fail to parse, the fallback call has no reply
    // scripted and errors.
    let transport = Arc::new(
        ScriptedTransport::new().script(CallKind::Generation, &[GIBBERISH, GIBBERISH]),
    );
    let config = test_config(2);

    let result = pipeline_over(&config, &transport).run("q").await;

    assert_eq!(result.best, Candidate::failure());
    assert!(result.rules.is_empty());
}

#[tokio::test]
async fn test_judge_without_best_line_defaults_to_first() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .script(
                CallKind::Generation,
                &[
                    "THOUGHT:\nfirst reasoning\n\nANSWER:\nfirst answer",
                    "THOUGHT:\nsecond reasoning\n\nANSWER:\nsecond answer",
                ],
            )
            .script(CallKind::Consistency, &["YES", "YES"])
            .script(CallKind::Critique, &["NO ISSUE", "NO ISSUE"])
            .script(CallKind::Judgment, &["Both answers seem reasonable."]),
    );
    let config = test_config(2);

    let result = pipeline_over(&config, &transport).run("q").await;

    assert_eq!(
        result.best,
        Candidate::new("first reasoning", "first answer")
    );
    assert!(result.rules.is_empty());
}

#[tokio::test]
async fn test_judge_transport_error_defaults_to_first() {
    // No judgment scripted: the judge call errors and the pipeline degrades
    // to the first candidate instead of surfacing the failure.
    let transport = Arc::new(
        ScriptedTransport::new()
            .script(
                CallKind::Generation,
                &[
                    "THOUGHT:\nfirst reasoning\n\nANSWER:\nfirst answer",
                    "THOUGHT:\nsecond reasoning\n\nANSWER:\nsecond answer",
                ],
            )
            .script(CallKind::Consistency, &["YES", "YES"])
            .script(CallKind::Critique, &["NO ISSUE", "NO ISSUE"]),
    );
    let config = test_config(2);

    let result = pipeline_over(&config, &transport).run("q").await;

    assert_eq!(
        result.best,
        Candidate::new("first reasoning", "first answer")
    );
    assert!(result.rules.is_empty());
}
