use std::sync::Arc;

use async_trait::async_trait;

use crate::deployment::DeploymentConfig;
use crate::health::{CheckError, CheckResponse, HealthCheck};
use crate::probe::{HttpProbe, HttpResponse};

/// Preflight the API health URL with the frontend as origin.
///
/// Transport failures are reported as a failed verdict instead of an error,
/// so they are still retried but never marked as errored.
pub struct CorsCheck {
    http: HttpProbe,
}

impl CorsCheck {
    pub fn new(http: HttpProbe) -> Self {
        Self { http }
    }
}

#[async_trait]
impl HealthCheck for CorsCheck {
    async fn check(&self, config: Arc<DeploymentConfig>) -> Result<CheckResponse, CheckError> {
        let (Some(api_url), Some(origin)) = (config.api_health_url(), config.frontend_url()) else {
            return Ok(CheckResponse::skipped("CORS check skipped - missing URLs"));
        };

        let preflight = self
            .http
            .options(
                &api_url,
                &[
                    ("Origin", origin.as_str()),
                    ("Access-Control-Request-Method", "GET"),
                    ("Access-Control-Request-Headers", "Content-Type"),
                ],
            )
            .await;

        match preflight {
            Ok(response) => Ok(evaluate_cors(&origin, &response)),
            Err(e) => Ok(CheckResponse::fail(format!("CORS check failed: {}", e))
                .with_detail("error", e.to_string())),
        }
    }
}

/// The origin is allowed if echoed back exactly or by wildcard.
pub fn evaluate_cors(origin: &str, response: &HttpResponse) -> CheckResponse {
    let allow_origin = response.header("access-control-allow-origin");
    let allow_methods = response.header("access-control-allow-methods");
    let valid = matches!(allow_origin, Some(o) if o == origin || o == "*");

    let message = if valid {
        "CORS configured correctly".to_string()
    } else {
        format!("CORS misconfigured: origin {} not allowed", origin)
    };

    CheckResponse::new(valid, message)
        .with_detail("origin", origin)
        .with_detail("allowOrigin", allow_origin)
        .with_detail("allowMethods", allow_methods)
        .with_detail("statusCode", response.status)
        .with_metric("responseTime", response.response_time_ms as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::CheckStatus;
    use reqwest::header::{HeaderMap, HeaderValue};

    fn preflight(allow_origin: Option<&'static str>) -> HttpResponse {
        let mut headers = HeaderMap::new();
        if let Some(origin) = allow_origin {
            headers.insert("access-control-allow-origin", HeaderValue::from_static(origin));
        }
        headers.insert(
            "access-control-allow-methods",
            HeaderValue::from_static("GET,POST"),
        );
        HttpResponse {
            status: 204,
            headers,
            body: String::new(),
            response_time_ms: 12,
        }
    }

    #[test]
    fn test_wildcard_allows_any_origin() {
        let resp = evaluate_cors("https://shop.example.com", &preflight(Some("*")));
        assert_eq!(resp.status(), CheckStatus::Pass);
        assert_eq!(resp.details["allowOrigin"], "*");
        assert_eq!(resp.details["allowMethods"], "GET,POST");
    }

    #[test]
    fn test_exact_origin() {
        let resp = evaluate_cors(
            "https://shop.example.com",
            &preflight(Some("https://shop.example.com")),
        );
        assert_eq!(resp.status(), CheckStatus::Pass);
        assert_eq!(resp.message.as_deref(), Some("CORS configured correctly"));
    }

    #[test]
    fn test_other_origin_fails() {
        let resp = evaluate_cors(
            "https://shop.example.com",
            &preflight(Some("https://admin.example.com")),
        );
        assert_eq!(resp.status(), CheckStatus::Fail);
        assert_eq!(
            resp.message.as_deref(),
            Some("CORS misconfigured: origin https://shop.example.com not allowed")
        );
    }

    #[test]
    fn test_missing_header_fails() {
        let resp = evaluate_cors("https://shop.example.com", &preflight(None));
        assert_eq!(resp.status(), CheckStatus::Fail);
        assert!(resp.details["allowOrigin"].is_null());
    }

    #[tokio::test]
    async fn test_missing_urls_skipped() {
        let check = CorsCheck::new(HttpProbe::new(std::time::Duration::from_secs(2)).unwrap());
        let mut config = DeploymentConfig::new("staging");
        config.backend.api_url = Some("https://api.example.com".into());

        let resp = check.check(Arc::new(config)).await.unwrap();
        assert!(resp.success && resp.warning);
    }
}
