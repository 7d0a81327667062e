//! Critique and refinement stage.

use crate::client::{CallKind, ChatTransport, Message};
use crate::models::{Candidate, Config, Result};
use crate::parse::{self, NO_ISSUE};
use crate::prompts;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Runs each candidate through critique and at most one refinement rewrite.
pub struct RefinePool {
    transport: Arc<dyn ChatTransport>,
    semaphore: Arc<Semaphore>,
    max_refine_rounds: u32,
}

impl RefinePool {
    pub fn new(transport: Arc<dyn ChatTransport>, config: &Config) -> Self {
        Self {
            transport,
            semaphore: Arc::new(Semaphore::new(config.stage_concurrency())),
            max_refine_rounds: config.max_refine_rounds,
        }
    }

    /// Process candidates independently, preserving input order and length.
    /// A task failure keeps the original candidate in its slot.
    pub async fn process(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        info!(count = candidates.len(), "processing candidates");

        let mut handles = Vec::with_capacity(candidates.len());
        for (slot, candidate) in candidates.iter().cloned().enumerate() {
            let transport = Arc::clone(&self.transport);
            let semaphore = Arc::clone(&self.semaphore);
            let rounds = self.max_refine_rounds;
            handles.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return candidate,
                };
                process_one(slot, transport.as_ref(), candidate, rounds).await
            }));
        }

        let mut processed = Vec::with_capacity(candidates.len());
        for (slot, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(candidate) => processed.push(candidate),
                Err(e) => {
                    warn!(slot, error = %e, "processing task panicked, keeping original");
                    processed.push(candidates[slot].clone());
                }
            }
        }

        processed
    }
}

/// Critique one candidate and, when issues remain and budget allows, request
/// a single rewrite. Every failure path returns the original candidate.
async fn process_one(
    slot: usize,
    transport: &dyn ChatTransport,
    candidate: Candidate,
    max_refine_rounds: u32,
) -> Candidate {
    let critique = match request_critique(transport, &candidate).await {
        Ok(critique) => critique,
        Err(e) => {
            warn!(slot, error = %e, "critique request failed, keeping original");
            return candidate;
        }
    };

    if parse::normalize_critique(&critique) == NO_ISSUE || max_refine_rounds == 0 {
        debug!(slot, "no refinement needed");
        return candidate;
    }

    debug!(slot, "issues found, requesting refinement");
    match request_refinement(transport, &candidate, &critique).await {
        Ok(Some(refined)) => refined,
        Ok(None) => {
            warn!(slot, "refinement did not follow the template, keeping original");
            candidate
        }
        Err(e) => {
            warn!(slot, error = %e, "refinement request failed, keeping original");
            candidate
        }
    }
}

async fn request_critique(transport: &dyn ChatTransport, candidate: &Candidate) -> Result<String> {
    let messages = vec![
        Message::system(prompts::CRIT_SYS),
        Message::user(prompts::crit_user(&candidate.thought, &candidate.answer)),
    ];
    transport
        .complete(CallKind::Critique, messages, 0.2, 256)
        .await
}

async fn request_refinement(
    transport: &dyn ChatTransport,
    candidate: &Candidate,
    critique: &str,
) -> Result<Option<Candidate>> {
    let messages = vec![
        Message::system(prompts::REF_SYS),
        Message::user(prompts::ref_user(&candidate.raw, critique)),
    ];
    let completion = transport
        .complete(CallKind::Refinement, messages, 0.4, 256)
        .await?;
    Ok(parse::parse_candidate(&completion))
}
