//! The check contract: what a check function returns and how it is invoked.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use super::status::{CheckStatus, Details, Metrics};
use super::CheckError;
use crate::deployment::DeploymentConfig;

/// Raw verdict returned by a check function.
///
/// Maps onto [`CheckStatus`] as follows:
///
/// | success | warning | status  |
/// |---------|---------|---------|
/// | true    | any     | pass    |
/// | false   | true    | warning |
/// | false   | false   | fail    |
///
/// A `success` with `warning` set still scores as a full pass; use
/// [`CheckResponse::warn`] to land in the warning tier.
#[derive(Debug, Clone, Default)]
pub struct CheckResponse {
    pub success: bool,
    pub warning: bool,
    pub message: Option<String>,
    pub details: Details,
    pub metrics: Metrics,
}

impl CheckResponse {
    pub fn new(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Healthy.
    pub fn pass(message: impl Into<String>) -> Self {
        Self::new(true, message)
    }

    /// Unhealthy.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(false, message)
    }

    /// Degraded but not blocking.
    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(false, message).with_warning(true)
    }

    /// Nothing to check for this deployment (optional component absent).
    pub fn skipped(message: impl Into<String>) -> Self {
        Self::new(true, message).with_warning(true)
    }

    pub fn with_warning(mut self, warning: bool) -> Self {
        self.warning = warning;
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn with_metric(mut self, key: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(key.into(), value);
        self
    }

    /// Status tier this response maps to.
    pub fn status(&self) -> CheckStatus {
        match (self.success, self.warning) {
            (true, _) => CheckStatus::Pass,
            (false, true) => CheckStatus::Warning,
            (false, false) => CheckStatus::Fail,
        }
    }

    /// Message, or a default derived from `success`.
    pub fn message_or_default(&self) -> String {
        match &self.message {
            Some(msg) if !msg.is_empty() => msg.clone(),
            _ if self.success => "Health check passed".to_string(),
            _ => "Health check failed".to_string(),
        }
    }
}

/// A probe against one aspect of a deployed environment.
///
/// Implementations may suspend on network I/O. Returning `Err` counts as a
/// failed attempt and is retried under the registration's retry policy.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check(&self, config: Arc<DeploymentConfig>) -> Result<CheckResponse, CheckError>;
}

/// Adapter turning an async closure into a [`HealthCheck`].
pub struct FnCheck<F> {
    f: F,
}

/// Wrap an async closure as a check.
///
/// ```rust,ignore
/// registry.register(
///     "queue_depth",
///     check_fn(|_config| async { Ok(CheckResponse::pass("queue drained")) }),
///     CheckOptions::new().non_critical(),
/// )?;
/// ```
pub fn check_fn<F, Fut>(f: F) -> FnCheck<F>
where
    F: Fn(Arc<DeploymentConfig>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<CheckResponse, CheckError>> + Send + 'static,
{
    FnCheck { f }
}

#[async_trait]
impl<F, Fut> HealthCheck for FnCheck<F>
where
    F: Fn(Arc<DeploymentConfig>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<CheckResponse, CheckError>> + Send + 'static,
{
    async fn check(&self, config: Arc<DeploymentConfig>) -> Result<CheckResponse, CheckError> {
        (self.f)(config).await
    }
}
