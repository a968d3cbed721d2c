use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use serde::Serialize;

use crate::deployment::DeploymentConfig;
use crate::health::{CheckError, CheckResponse, HealthCheck};
use crate::probe::HttpProbe;

/// Slowest response that still passes.
const FAIL_THRESHOLD_MS: u64 = 5000;
/// Slowest response that does not warn.
const WARN_THRESHOLD_MS: u64 = 2000;

/// Latency of one monitored endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointTiming {
    pub name: String,
    pub url: String,
    pub response_time: u64,
    pub status_code: u16,
}

/// Time one GET against the frontend and the API health endpoint.
pub struct PerformanceCheck {
    http: HttpProbe,
}

impl PerformanceCheck {
    pub fn new(http: HttpProbe) -> Self {
        Self { http }
    }

    async fn time(&self, name: &str, url: String) -> Result<EndpointTiming, CheckError> {
        let response = self.http.get(&url).await?;
        Ok(EndpointTiming {
            name: name.to_string(),
            url,
            response_time: response.response_time_ms,
            status_code: response.status,
        })
    }
}

#[async_trait]
impl HealthCheck for PerformanceCheck {
    async fn check(&self, config: Arc<DeploymentConfig>) -> Result<CheckResponse, CheckError> {
        let endpoints: Vec<(&str, String)> = [
            ("frontend", config.frontend_url()),
            ("api", config.api_health_url()),
        ]
        .into_iter()
        .filter_map(|(name, url)| url.map(|u| (name, u)))
        .collect();

        if endpoints.is_empty() {
            return Ok(CheckResponse::skipped("No URLs for performance check"));
        }

        let timings = try_join_all(
            endpoints
                .into_iter()
                .map(|(name, url)| self.time(name, url)),
        )
        .await?;

        Ok(evaluate_performance(&timings))
    }
}

/// Fail above 5000 ms, warn above 2000 ms, judged on the slowest endpoint.
pub fn evaluate_performance(timings: &[EndpointTiming]) -> CheckResponse {
    let max = timings.iter().map(|t| t.response_time).max().unwrap_or(0);
    let average = if timings.is_empty() {
        0.0
    } else {
        timings.iter().map(|t| t.response_time as f64).sum::<f64>() / timings.len() as f64
    };

    let message = format!(
        "Performance check: avg {}ms, max {}ms",
        average.round() as u64,
        max
    );

    let response = if max > FAIL_THRESHOLD_MS {
        CheckResponse::fail(message)
    } else if max > WARN_THRESHOLD_MS {
        CheckResponse::warn(message)
    } else {
        CheckResponse::pass(message)
    };

    response
        .with_detail("checks", serde_json::to_value(timings).unwrap_or_default())
        .with_detail("averageResponseTime", average)
        .with_detail("maxResponseTime", max)
        .with_metric("averageResponseTime", average)
        .with_metric("maxResponseTime", max as f64)
}
