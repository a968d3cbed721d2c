use std::sync::Arc;

use async_trait::async_trait;

use crate::deployment::DeploymentConfig;
use crate::health::{CheckError, CheckResponse, HealthCheck};

/// Policy checks on the deployment configuration itself. No I/O.
///
/// Production must not ship debug settings or a wildcard CORS policy; any
/// environment other than development should have a CDN distribution and
/// an API gateway.
pub struct EnvironmentCheck;

impl EnvironmentCheck {
    pub fn evaluate(config: &DeploymentConfig) -> CheckResponse {
        let mut issues: Vec<&str> = Vec::new();
        let mut warnings: Vec<&str> = Vec::new();

        if config.is_production() {
            if config.debug_mode() {
                issues.push("Debug mode enabled in production");
            }
            if config.log_level() == Some("debug") {
                issues.push("Debug logging enabled in production");
            }
            if config.cors_origins() == Some("*") {
                issues.push("Wildcard CORS enabled in production");
            }
        }

        if !config.is_development() {
            if is_blank(&config.frontend.cdn_distribution_id) {
                warnings.push("No CloudFront distribution configured");
            }
            if is_blank(&config.backend.api_gateway_id) {
                warnings.push("No API Gateway configured");
            }
        }

        let response = if !issues.is_empty() {
            CheckResponse::fail(format!(
                "Configuration issues found: {}",
                issues.join(", ")
            ))
        } else if !warnings.is_empty() {
            CheckResponse::warn(format!(
                "Environment configuration valid ({} warnings)",
                warnings.len()
            ))
        } else {
            CheckResponse::pass("Environment configuration valid (0 warnings)")
        };

        response
            .with_metric("issues", issues.len() as f64)
            .with_metric("warnings", warnings.len() as f64)
            .with_detail("issues", issues)
            .with_detail("warnings", warnings)
            .with_detail("environment", config.environment.clone())
    }
}

#[async_trait]
impl HealthCheck for EnvironmentCheck {
    async fn check(&self, config: Arc<DeploymentConfig>) -> Result<CheckResponse, CheckError> {
        Ok(Self::evaluate(&config))
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}
