//! Runtime configuration for thinker.
//!
//! Every tunable is resolved once from the environment at process start; the
//! resulting value is immutable for the lifetime of the run and shared by
//! reference into every component.

use thiserror::Error;

/// Immutable runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the OpenAI-compatible endpoint (no trailing slash)
    pub base_url: String,

    /// Bearer credential sent with every request
    pub api_key: String,

    /// Model id requested for every completion
    pub model: String,

    /// Number of independent drafts to solicit per question
    pub candidate_count: usize,

    /// Refinement budget per candidate (0 disables refinement)
    pub max_refine_rounds: u32,

    /// Connection pool size and upper bound on stage concurrency
    pub max_workers: usize,

    /// Log verbosity, parsed by the binary (e.g. "INFO", "DEBUG")
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:18080/v1".to_string(),
            api_key: "local-key".to_string(),
            model: "bitnet".to_string(),
            candidate_count: 5,
            max_refine_rounds: 1,
            max_workers: 4,
            log_level: "INFO".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            base_url: lookup("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            api_key: lookup("OPENAI_API_KEY").unwrap_or(defaults.api_key),
            model: lookup("OPENAI_MODEL").unwrap_or(defaults.model),
            candidate_count: parse_var(&lookup, "N_CANDIDATES", defaults.candidate_count)?,
            max_refine_rounds: parse_var(&lookup, "MAX_REFINE_ROUNDS", defaults.max_refine_rounds)?,
            max_workers: parse_var(&lookup, "MAX_WORKERS", defaults.max_workers)?,
            log_level: lookup("LOGLEVEL").unwrap_or(defaults.log_level),
        })
    }

    /// Concurrency ceiling for the generation and critique stages.
    ///
    /// Capped at 3 regardless of the configured worker budget; the worker
    /// budget still sizes the connection pool.
    pub fn stage_concurrency(&self) -> usize {
        self.max_workers.min(3).max(1)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        None => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.base_url, "http://localhost:18080/v1");
        assert_eq!(config.api_key, "local-key");
        assert_eq!(config.model, "bitnet");
        assert_eq!(config.candidate_count, 5);
        assert_eq!(config.max_refine_rounds, 1);
        assert_eq!(config.max_workers, 4);
        assert_eq!(config.log_level, "INFO");
    }

    #[test]
    fn test_overrides_and_trailing_slash_trim() {
        let config = Config::from_lookup(lookup_from(&[
            ("OPENAI_BASE_URL", "https://example.com/v1/"),
            ("N_CANDIDATES", "7"),
            ("MAX_WORKERS", "2"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://example.com/v1");
        assert_eq!(config.candidate_count, 7);
        assert_eq!(config.max_workers, 2);
    }

    #[test]
    fn test_malformed_number_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[("N_CANDIDATES", "several")])).unwrap_err();
        match err {
            ConfigError::InvalidValue { var, value } => {
                assert_eq!(var, "N_CANDIDATES");
                assert_eq!(value, "several");
            }
        }
    }

    #[test]
    fn test_stage_concurrency_ceiling() {
        let mut config = Config::default();
        assert_eq!(config.stage_concurrency(), 3);
        config.max_workers = 2;
        assert_eq!(config.stage_concurrency(), 2);
        config.max_workers = 16;
        assert_eq!(config.stage_concurrency(), 3);
        config.max_workers = 0;
        assert_eq!(config.stage_concurrency(), 1);
    }
}
