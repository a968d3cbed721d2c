//! Certificate expiry checks against a local TLS listener

use std::sync::Arc;

use deploy_health::checks::TlsCertificateCheck;
use deploy_health::health::{CheckStatus, HealthCheck};
use deploy_health::DeploymentConfig;

use crate::helpers::{closed_port, deployment, probes, spawn_tls_server};

fn with_frontend(url: String) -> Arc<DeploymentConfig> {
    Arc::new(deployment(Some(url), None))
}

#[tokio::test]
async fn test_certificate_expiring_soon_warns() {
    let url = spawn_tls_server(time::Duration::days(10)).await;

    let resp = TlsCertificateCheck::new(probes().tls)
        .check(with_frontend(url.clone()))
        .await
        .unwrap();

    assert_eq!(resp.status(), CheckStatus::Warning);
    assert_eq!(resp.details["minimumExpiry"], 10);
    assert_eq!(resp.details["certificates"][0]["url"], url.as_str());
    assert_eq!(resp.details["certificates"][0]["subject"], "localhost");
    assert_eq!(resp.metrics["certificateCount"], 1.0);
}

#[tokio::test]
async fn test_long_lived_certificate_passes() {
    let url = spawn_tls_server(time::Duration::days(90)).await;

    let resp = TlsCertificateCheck::new(probes().tls)
        .check(with_frontend(url))
        .await
        .unwrap();

    assert_eq!(resp.status(), CheckStatus::Pass);
    assert_eq!(resp.details["minimumExpiry"], 90);
}

#[tokio::test]
async fn test_minimum_across_endpoints() {
    let frontend = spawn_tls_server(time::Duration::days(200)).await;
    let api = spawn_tls_server(time::Duration::days(20)).await;

    let config = deployment(Some(frontend), Some(api));
    let resp = TlsCertificateCheck::new(probes().tls)
        .check(Arc::new(config))
        .await
        .unwrap();

    assert_eq!(resp.status(), CheckStatus::Warning);
    assert_eq!(resp.details["minimumExpiry"], 20);
    assert_eq!(resp.metrics["certificateCount"], 2.0);
}

#[tokio::test]
async fn test_unreachable_endpoint_fails() {
    let good = spawn_tls_server(time::Duration::days(90)).await;
    let dead = format!("https://127.0.0.1:{}", closed_port());

    let config = deployment(Some(good), Some(dead));
    let resp = TlsCertificateCheck::new(probes().tls)
        .check(Arc::new(config))
        .await
        .unwrap();

    assert_eq!(resp.status(), CheckStatus::Fail);
    assert_eq!(resp.details["minimumExpiry"], 0);
    assert_eq!(resp.details["certificates"][1]["valid"], false);
}

#[tokio::test]
async fn test_plain_http_endpoints_skipped() {
    let config = deployment(
        Some("http://shop.example.com".into()),
        Some("http://api.example.com".into()),
    );
    let resp = TlsCertificateCheck::new(probes().tls)
        .check(Arc::new(config))
        .await
        .unwrap();

    assert!(resp.success && resp.warning);
    assert_eq!(resp.message.as_deref(), Some("No HTTPS URLs to check"));
}
