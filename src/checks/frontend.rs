use std::sync::Arc;

use async_trait::async_trait;

use crate::deployment::DeploymentConfig;
use crate::health::{CheckError, CheckResponse, HealthCheck};
use crate::probe::HttpProbe;

/// GET the public frontend URL; any 2xx or 3xx passes.
pub struct FrontendCheck {
    http: HttpProbe,
}

impl FrontendCheck {
    pub fn new(http: HttpProbe) -> Self {
        Self { http }
    }
}

#[async_trait]
impl HealthCheck for FrontendCheck {
    async fn check(&self, config: Arc<DeploymentConfig>) -> Result<CheckResponse, CheckError> {
        if !config.has_frontend() {
            return Ok(CheckResponse::skipped("No frontend configured"));
        }
        let Some(url) = config.frontend_url() else {
            return Ok(CheckResponse::fail("Cannot determine frontend URL"));
        };

        let response = self.http.get(&url).await?;

        Ok(CheckResponse::new(
            response.is_reachable(),
            format!("Frontend responded with HTTP {}", response.status),
        )
        .with_detail("url", url)
        .with_detail("statusCode", response.status)
        .with_detail("responseTime", response.response_time_ms)
        .with_detail("contentLength", response.content_length())
        .with_metric("responseTime", response.response_time_ms as f64)
        .with_metric("statusCode", f64::from(response.status)))
    }
}
