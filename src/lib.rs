//! thinker - multi-candidate reasoning loop over OpenAI-compatible endpoints.
//!
//! ## Architecture
//!
//! A question fans out into N independent drafts, each parsed into a
//! structured THOUGHT/ANSWER candidate and verified for consistency against
//! the question. Surviving candidates are critiqued and optionally refined,
//! then a judge selects the best one and distills reusable reasoning
//! heuristics from it.
//!
//! ## Pipeline
//!
//! Generate → Critique/Refine → Judge, with a full barrier between stages and
//! isolated-failure semantics throughout: one request's failure never takes
//! down a sibling task, and the loop always returns a well-formed result.

pub mod client;
pub mod models;
pub mod parse;
pub mod pipeline;
pub mod pool;
pub mod prompts;

// Re-exports for convenience
pub use client::{CallKind, ChatTransport, HttpChatClient, Message};
pub use models::{Candidate, Config, ConfigError, PipelineResult, Result, ThinkerError};
pub use pipeline::ThinkingPipeline;
pub use pool::{ConsistencyChecker, GeneratorPool, Judge, RefinePool};
