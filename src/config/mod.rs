//! Configuration module for deploy_health.
//!
//! This module provides centralized configuration loading from environment variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use deploy_health::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Mode: {}", config.orchestrator.mode);
//! println!("Default timeout: {:?}", config.orchestrator.default_timeout);
//! ```

mod error;
mod logging;
mod orchestrator;
mod parse;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use orchestrator::{
    ExecutionMode, OrchestratorConfig, DEFAULT_RETRY_COUNT, DEFAULT_RETRY_DELAY, DEFAULT_TIMEOUT,
};
pub use parse::{env_opt, parse_duration};

/// Serializes tests that mutate process environment.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Orchestrator configuration.
    pub orchestrator: OrchestratorConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            orchestrator: OrchestratorConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Mode: {}", self.orchestrator.mode);
        info!(
            "  Default timeout: {}ms",
            self.orchestrator.default_timeout.as_millis()
        );
        info!("  Default attempts: {}", self.orchestrator.default_retry_count);
        info!(
            "  Retry delay: {}ms",
            self.orchestrator.retry_delay.as_millis()
        );

        if let Some(limit) = self.orchestrator.max_concurrency {
            info!("  Concurrency limit: {}", limit);
        }

        if !self.orchestrator.skip.is_empty() {
            info!("  Skipping: {}", self.orchestrator.skip.join(", "));
        }
    }
}
