//! Transport client for OpenAI-compatible chat completion endpoints.

use crate::models::{Config, Result, ThinkerError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Message in a chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Logical purpose of a completion call.
///
/// Diagnostics only: the tag shows up in log fields and has no effect on
/// request behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Generation,
    Critique,
    Refinement,
    Judgment,
    Consistency,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Generation => "generation",
            Self::Critique => "critique",
            Self::Refinement => "refinement",
            Self::Judgment => "judgment",
            Self::Consistency => "consistency",
        };
        f.write_str(name)
    }
}

/// Anything that can turn role-tagged messages plus generation parameters
/// into a single text completion.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn complete(
        &self,
        kind: CallKind,
        messages: Vec<Message>,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String>;
}

/// Stop sequence sent with every request so judge output ends after the rules.
const STOP_SEQUENCE: &str = "\n\nRULE:";

/// Fixed per-request network timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection-level retry budget. Callers must not assume idempotent retry
/// beyond this.
const CONNECT_RETRIES: u32 = 3;

/// Chat completion request payload.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
    max_tokens: u32,
    stop: Vec<String>,
}

/// Chat completion response.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// HTTP-backed transport with a shared connection pool.
pub struct HttpChatClient {
    client: reqwest::Client,
    model: String,
    url: String,
}

impl HttpChatClient {
    /// Build a client from configuration. The connection pool is sized to the
    /// configured worker budget and shared by every concurrent task.
    pub fn new(config: &Config) -> Result<Self> {
        let auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| ThinkerError::Internal(format!("invalid credential header: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(config.max_workers)
            .default_headers(headers)
            .build()
            .map_err(ThinkerError::Network)?;

        Ok(Self {
            client,
            model: config.model.clone(),
            url: format!("{}/chat/completions", config.base_url),
        })
    }
}

#[async_trait]
impl ChatTransport for HttpChatClient {
    async fn complete(
        &self,
        kind: CallKind,
        messages: Vec<Message>,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature,
            max_tokens,
            stop: vec![STOP_SEQUENCE.to_string()],
        };

        let start = Instant::now();
        let mut last_error: Option<ThinkerError> = None;

        for attempt in 0..CONNECT_RETRIES {
            let response = match self.client.post(&self.url).json(&request).send().await {
                Ok(response) => response,
                Err(e) => {
                    let error = if e.is_timeout() {
                        ThinkerError::Timeout(REQUEST_TIMEOUT)
                    } else {
                        ThinkerError::Network(e)
                    };
                    debug!(kind = %kind, attempt, error = %error, "connection attempt failed");
                    last_error = Some(error);
                    if attempt < CONNECT_RETRIES - 1 {
                        tokio::time::sleep(Duration::from_secs(2u64.pow(attempt))).await;
                    }
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(ThinkerError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body: ChatCompletionResponse = response.json().await.map_err(|e| {
                ThinkerError::InvalidResponse(format!("malformed completion body: {e}"))
            })?;

            let content = body
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .ok_or_else(|| {
                    ThinkerError::InvalidResponse("no choices in response".to_string())
                })?;

            info!(
                kind = %kind,
                elapsed_secs = format!("{:.2}", start.elapsed().as_secs_f64()),
                "completion finished"
            );
            return Ok(content);
        }

        Err(last_error
            .unwrap_or_else(|| ThinkerError::Internal("retry loop exhausted".to_string())))
    }
}
