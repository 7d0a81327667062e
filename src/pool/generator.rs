//! Candidate generation pool.

use crate::client::{CallKind, ChatTransport, Message};
use crate::models::{Candidate, Config};
use crate::parse;
use crate::pool::ConsistencyChecker;
use crate::prompts;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Fans out independent generation requests and keeps the drafts that parse
/// and survive the consistency check.
pub struct GeneratorPool {
    transport: Arc<dyn ChatTransport>,
    checker: Arc<ConsistencyChecker>,
    semaphore: Arc<Semaphore>,
    candidate_count: usize,
}

impl GeneratorPool {
    pub fn new(transport: Arc<dyn ChatTransport>, config: &Config) -> Self {
        Self {
            checker: Arc::new(ConsistencyChecker::new(Arc::clone(&transport))),
            transport,
            semaphore: Arc::new(Semaphore::new(config.stage_concurrency())),
            candidate_count: config.candidate_count,
        }
    }

    /// Generate up to `candidate_count` candidates for `question`.
    ///
    /// One task per candidate; a task that fails for any reason only drops
    /// its own slot. Surviving candidates keep submission order.
    pub async fn generate(&self, question: &str) -> Vec<Candidate> {
        info!(count = self.candidate_count, "generating candidates");

        let mut handles = Vec::with_capacity(self.candidate_count);
        for slot in 0..self.candidate_count {
            let transport = Arc::clone(&self.transport);
            let checker = Arc::clone(&self.checker);
            let semaphore = Arc::clone(&self.semaphore);
            let question = question.to_string();
            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok()?;
                generate_one(slot, transport.as_ref(), &checker, &question).await
            }));
        }

        let mut candidates = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(Some(candidate)) => candidates.push(candidate),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "generation task panicked"),
            }
        }

        info!(count = candidates.len(), "generated valid candidates");
        candidates
    }
}

/// Run a single generation attempt end to end. All failures collapse to
/// `None`; siblings are unaffected.
async fn generate_one(
    slot: usize,
    transport: &dyn ChatTransport,
    checker: &ConsistencyChecker,
    question: &str,
) -> Option<Candidate> {
    let completion = match transport
        .complete(CallKind::Generation, generation_messages(question), 0.2, 256)
        .await
    {
        Ok(completion) => completion,
        Err(e) => {
            warn!(slot, error = %e, "generation request failed");
            return None;
        }
    };

    let Some(candidate) = parse::parse_candidate(&completion) else {
        warn!(slot, "candidate did not follow the template");
        return None;
    };

    match checker.check(question, &candidate.answer).await {
        Ok((true, _)) => {
            debug!(slot, "candidate accepted");
            Some(candidate)
        }
        Ok((false, explanation)) => {
            warn!(slot, explanation = %explanation, "candidate failed consistency check");
            None
        }
        Err(e) => {
            warn!(slot, error = %e, "consistency check failed");
            None
        }
    }
}

/// Messages for a generation request; also used by the orchestrator's
/// single-shot fallback.
pub(crate) fn generation_messages(question: &str) -> Vec<Message> {
    vec![
        Message::system(prompts::GEN_SYS),
        Message::user(prompts::gen_user(question)),
    ]
}
