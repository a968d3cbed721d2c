//! Orchestrator configuration.

use std::time::Duration;

use serde::Serialize;

use super::parse::{env_bool, env_duration, env_list, env_parse};
use super::ConfigError;

/// Default per-check timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of attempts per check.
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Default delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(2000);

/// Execution strategy for the selected checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Every check runs as an independent task.
    #[default]
    Parallel,
    /// One check at a time in registry order, stopping on critical failure.
    Sequential,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Parallel => "parallel",
            ExecutionMode::Sequential => "sequential",
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orchestrator settings loaded from environment.
#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    /// Timeout inherited by checks registered without one.
    pub default_timeout: Duration,
    /// Attempt count inherited by checks registered without one (never zero).
    pub default_retry_count: u32,
    /// Fixed delay between attempts of the same check.
    pub retry_delay: Duration,
    /// Parallel or sequential execution.
    pub mode: ExecutionMode,
    /// Parallel-mode concurrency bound (None = unbounded fan-out).
    pub max_concurrency: Option<usize>,
    /// Check names excluded from selection.
    pub skip: Vec<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_TIMEOUT,
            default_retry_count: DEFAULT_RETRY_COUNT,
            retry_delay: DEFAULT_RETRY_DELAY,
            mode: ExecutionMode::Parallel,
            max_concurrency: None,
            skip: Vec::new(),
        }
    }
}

impl OrchestratorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let default_timeout =
            env_duration("HEALTH_CHECK_TIMEOUT", "30s")?.ok_or_else(|| ConfigError::Invalid {
                key: "HEALTH_CHECK_TIMEOUT".into(),
                message: "timeout cannot be disabled".into(),
            })?;

        let default_retry_count: u32 = env_parse("HEALTH_CHECK_RETRIES", DEFAULT_RETRY_COUNT)?;
        if default_retry_count == 0 {
            return Err(ConfigError::Invalid {
                key: "HEALTH_CHECK_RETRIES".into(),
                message: "retry count cannot be zero".into(),
            });
        }

        let retry_delay = env_duration("HEALTH_CHECK_RETRY_DELAY", "2000ms")?.unwrap_or_default();

        let mode = if env_bool("HEALTH_CHECK_PARALLEL", true) {
            ExecutionMode::Parallel
        } else {
            ExecutionMode::Sequential
        };

        let concurrency: usize = env_parse("HEALTH_CHECK_CONCURRENCY", 0)?;

        Ok(Self {
            default_timeout,
            default_retry_count,
            retry_delay,
            mode,
            max_concurrency: (concurrency > 0).then_some(concurrency),
            skip: env_list("HEALTH_CHECK_SKIP"),
        })
    }

    /// Set the execution mode.
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the inter-retry delay.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Bound parallel-mode concurrency.
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = (limit > 0).then_some(limit);
        self
    }

    /// Exclude a check from selection.
    pub fn with_skip(mut self, name: impl Into<String>) -> Self {
        self.skip.push(name.into());
        self
    }
}
