use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;

use crate::deployment::DeploymentConfig;
use crate::health::{CheckError, CheckResponse, HealthCheck};
use crate::probe::{CertificateInfo, TlsProbe};

/// Certificates expiring within this many days are a warning.
const EXPIRY_WARNING_DAYS: i64 = 30;

/// Inspect the certificate of every HTTPS endpoint in the deployment.
pub struct TlsCertificateCheck {
    tls: TlsProbe,
}

impl TlsCertificateCheck {
    pub fn new(tls: TlsProbe) -> Self {
        Self { tls }
    }
}

#[async_trait]
impl HealthCheck for TlsCertificateCheck {
    async fn check(&self, config: Arc<DeploymentConfig>) -> Result<CheckResponse, CheckError> {
        let endpoints = config.https_endpoints();
        if endpoints.is_empty() {
            return Ok(CheckResponse::skipped("No HTTPS URLs to check"));
        }

        let certificates = join_all(endpoints.iter().map(|url| self.tls.inspect(url))).await;
        Ok(evaluate_certificates(&certificates))
    }
}

/// Pass when every certificate is valid for more than 30 days, warn when
/// the soonest expiry is within 30 days, fail when any endpoint is invalid.
pub fn evaluate_certificates(certificates: &[CertificateInfo]) -> CheckResponse {
    let all_valid = certificates.iter().all(|c| c.valid);
    let minimum_expiry = certificates
        .iter()
        .map(|c| c.days_until_expiry)
        .min()
        .unwrap_or(0);

    let message = format!(
        "SSL certificates {}, minimum expiry: {} days",
        if all_valid { "valid" } else { "invalid" },
        minimum_expiry
    );

    let response = if !all_valid {
        CheckResponse::fail(message)
    } else if minimum_expiry > EXPIRY_WARNING_DAYS {
        CheckResponse::pass(message)
    } else {
        CheckResponse::warn(message)
    };

    response
        .with_detail(
            "certificates",
            serde_json::to_value(certificates).unwrap_or_default(),
        )
        .with_detail("minimumExpiry", minimum_expiry)
        .with_metric("certificateCount", certificates.len() as f64)
        .with_metric("minimumExpiry", minimum_expiry as f64)
}
