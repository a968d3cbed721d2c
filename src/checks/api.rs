use std::sync::Arc;

use async_trait::async_trait;

use crate::deployment::DeploymentConfig;
use crate::health::{CheckError, CheckResponse, HealthCheck};
use crate::probe::HttpProbe;

/// GET `<api base>/health`; only HTTP 200 passes.
pub struct ApiHealthCheck {
    http: HttpProbe,
}

impl ApiHealthCheck {
    pub fn new(http: HttpProbe) -> Self {
        Self { http }
    }
}

#[async_trait]
impl HealthCheck for ApiHealthCheck {
    async fn check(&self, config: Arc<DeploymentConfig>) -> Result<CheckResponse, CheckError> {
        let Some(url) = config.api_health_url() else {
            return Ok(CheckResponse::skipped("No API configured"));
        };

        let response = self.http.get(&url).await?;

        Ok(CheckResponse::new(
            response.status == 200,
            format!("API health endpoint responded with HTTP {}", response.status),
        )
        .with_detail("url", url)
        .with_detail("statusCode", response.status)
        .with_detail("responseTime", response.response_time_ms)
        .with_detail("body", response.body_json())
        .with_metric("responseTime", response.response_time_ms as f64)
        .with_metric("statusCode", f64::from(response.status)))
    }
}
