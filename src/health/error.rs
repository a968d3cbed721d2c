//! Health check error types.

use std::fmt;
use std::time::Duration;

/// Error raised by a check function or by the per-check runner.
///
/// Every variant is retried under the check's retry policy and, once
/// attempts run out, surfaces as a terminal `fail` outcome with
/// `details.error` set to the error's message.
#[derive(Debug, Clone)]
pub enum CheckError {
    /// HTTP request failed before a response arrived (DNS, connect, reset).
    Http { url: String, message: String },

    /// TLS connection or certificate read failed.
    Tls { host: String, message: String },

    /// The check did not settle within its timeout.
    Timeout { check: String, timeout: Duration },

    /// The check task panicked.
    Panicked(String),

    /// Any other check-specific failure.
    Other(String),
}

impl CheckError {
    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, CheckError::Timeout { .. })
    }

    /// Check if this is a transport-level error.
    pub fn is_network(&self) -> bool {
        matches!(self, CheckError::Http { .. } | CheckError::Tls { .. })
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::Http { url, message } => {
                write!(f, "request to {} failed: {}", url, message)
            }
            CheckError::Tls { host, message } => {
                write!(f, "TLS connection to {} failed: {}", host, message)
            }
            CheckError::Timeout { check, timeout } => {
                write!(
                    f,
                    "health check '{}' timed out after {}ms",
                    check,
                    timeout.as_millis()
                )
            }
            CheckError::Panicked(msg) => write!(f, "health check panicked: {}", msg),
            CheckError::Other(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for CheckError {}

impl From<reqwest::Error> for CheckError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            format!("connection failed: {}", root_cause(&err))
        } else {
            root_cause(&err)
        };
        CheckError::Http { url, message }
    }
}

impl From<String> for CheckError {
    fn from(msg: String) -> Self {
        CheckError::Other(msg)
    }
}

impl From<&str> for CheckError {
    fn from(msg: &str) -> Self {
        CheckError::Other(msg.to_string())
    }
}

/// Innermost error message; reqwest wraps hyper wraps io.
fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A check with this name is already registered.
    Duplicate { name: String },
    /// Attempt count of zero would never run the check.
    ZeroRetries { name: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Duplicate { name } => {
                write!(f, "health check '{}' is already registered", name)
            }
            RegistryError::ZeroRetries { name } => {
                write!(f, "health check '{}' must allow at least one attempt", name)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Failure of the orchestration machinery itself, not of any one check.
#[derive(Debug, Clone)]
pub enum OrchestrationError {
    /// Input cannot be checked at all.
    InvalidConfig(String),
    /// A check task was cancelled by the runtime before settling.
    Cancelled { check: String },
}

impl fmt::Display for OrchestrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrchestrationError::InvalidConfig(msg) => {
                write!(f, "invalid deployment configuration: {}", msg)
            }
            OrchestrationError::Cancelled { check } => {
                write!(f, "health check task '{}' was cancelled", check)
            }
        }
    }
}

impl std::error::Error for OrchestrationError {}
