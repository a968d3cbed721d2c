//! Logging configuration.

use super::parse::env_or;
use super::ConfigError;

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable tracing-subscriber output.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Log level filter (from LOG_LEVEL or RUST_LOG).
    pub filter: String,
    /// Output format (from LOG_FORMAT).
    pub format: LogFormat,
    /// Service name for structured logging.
    pub service_name: String,
}

impl LoggingConfig {
    /// Load configuration from environment variables.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default
    ///
    /// LOG_LEVEL accepts simple values: trace, debug, info, warn, error
    /// RUST_LOG accepts full tracing filter syntax: deploy_health=debug,reqwest=warn
    pub fn from_env() -> Result<Self, ConfigError> {
        let format = match env_or("LOG_FORMAT", "text").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "text" | "plain" => LogFormat::Text,
            other => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT".into(),
                    message: format!("expected text or json, got '{}'", other),
                })
            }
        };

        Ok(Self {
            filter: Self::resolve_log_filter(),
            format,
            service_name: env_or("SERVICE_NAME", "deploy_health"),
        })
    }

    /// Resolve log filter from environment.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default (info)
    fn resolve_log_filter() -> String {
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            let level = level.to_lowercase();
            match level.as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {
                    return format!("deploy_health={},check={}", level, level);
                }
                _ => {
                    // Invalid level, fall through to RUST_LOG
                    eprintln!(
                        "Warning: Invalid LOG_LEVEL '{}', expected: trace, debug, info, warn, error",
                        level
                    );
                }
            }
        }

        if let Ok(filter) = std::env::var("RUST_LOG") {
            return filter;
        }

        "deploy_health=info,check=info".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_log_level_priority() {
        let _guard = crate::config::ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        env::remove_var("LOG_LEVEL");
        env::remove_var("RUST_LOG");

        assert_eq!(
            LoggingConfig::resolve_log_filter(),
            "deploy_health=info,check=info"
        );

        env::set_var("RUST_LOG", "deploy_health=warn,reqwest=debug");
        assert_eq!(
            LoggingConfig::resolve_log_filter(),
            "deploy_health=warn,reqwest=debug"
        );

        // LOG_LEVEL takes priority over RUST_LOG
        env::set_var("LOG_LEVEL", "debug");
        assert_eq!(
            LoggingConfig::resolve_log_filter(),
            "deploy_health=debug,check=debug"
        );

        env::remove_var("LOG_LEVEL");
        env::remove_var("RUST_LOG");
    }

    #[test]
    fn test_log_format() {
        let _guard = crate::config::ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        env::set_var("LOG_FORMAT", "JSON");
        assert_eq!(LoggingConfig::from_env().unwrap().format, LogFormat::Json);

        env::set_var("LOG_FORMAT", "xml");
        assert!(LoggingConfig::from_env().is_err());

        env::remove_var("LOG_FORMAT");
        assert_eq!(LoggingConfig::from_env().unwrap().format, LogFormat::Text);
    }
}
