//! Thinking loop: Generate → Process → Judge with graceful degradation.

use crate::client::{CallKind, ChatTransport, HttpChatClient};
use crate::models::{Candidate, Config, PipelineResult, Result, ThinkerError};
use crate::parse;
use crate::pool::{generation_messages, GeneratorPool, Judge, RefinePool};
use std::sync::Arc;
use tracing::{info, warn};

/// Orchestrates the full pipeline for a single question.
///
/// The three stages run strictly in sequence with a full barrier between
/// them. The loop always returns a well-formed result, no matter how many
/// individual calls fail.
pub struct ThinkingPipeline {
    transport: Arc<dyn ChatTransport>,
    generator: GeneratorPool,
    processor: RefinePool,
    judge: Judge,
}

impl ThinkingPipeline {
    /// Build a pipeline backed by the HTTP transport.
    pub fn new(config: &Config) -> Result<Self> {
        let transport: Arc<dyn ChatTransport> = Arc::new(HttpChatClient::new(config)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Build a pipeline over any transport.
    pub fn with_transport(config: &Config, transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            generator: GeneratorPool::new(Arc::clone(&transport), config),
            processor: RefinePool::new(Arc::clone(&transport), config),
            judge: Judge::new(Arc::clone(&transport)),
            transport,
        }
    }

    /// Run the thinking loop. Never fails: degraded outcomes collapse into a
    /// synthetic candidate instead of an error.
    pub async fn run(&self, question: &str) -> PipelineResult {
        let candidates = self.generator.generate(question).await;

        if candidates.is_empty() {
            warn!("no valid candidates survived generation, trying single-shot fallback");
            return self.fallback(question).await;
        }

        let candidates = self.processor.process(candidates).await;

        let (best_index, rules) = match self.judge.judge(&candidates).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(error = %e, "judgment failed, using first candidate");
                (0, Vec::new())
            }
        };

        info!(best_index, rules = rules.len(), "selected best candidate");
        let best = candidates
            .into_iter()
            .nth(best_index)
            .unwrap_or_else(Candidate::failure);

        PipelineResult { best, rules }
    }

    /// One unchecked generation attempt, then the synthetic failure floor.
    async fn fallback(&self, question: &str) -> PipelineResult {
        let attempt = self
            .transport
            .complete(CallKind::Generation, generation_messages(question), 0.2, 256)
            .await
            .and_then(|completion| {
                parse::parse_candidate(&completion)
                    .ok_or(ThinkerError::ParseFailure(completion))
            });

        let best = match attempt {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!(error = %e, "fallback generation failed");
                Candidate::failure()
            }
        };

        PipelineResult {
            best,
            rules: Vec::new(),
        }
    }
}
