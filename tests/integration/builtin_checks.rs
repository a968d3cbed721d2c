//! Built-in HTTP checks against mock servers

use std::sync::Arc;

use deploy_health::checks::{ApiHealthCheck, CorsCheck, FrontendCheck, PerformanceCheck};
use deploy_health::health::{CheckStatus, HealthCheck};

use crate::helpers::{closed_port, deployment, probes};

#[tokio::test]
async fn test_api_health_ok() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/health")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"ok","version":"1.4.2"}"#)
        .create_async()
        .await;

    // Stage path is stripped before /health is appended
    let config = deployment(None, Some(format!("{}/v1/prod", server.url())));
    let resp = ApiHealthCheck::new(probes().http)
        .check(Arc::new(config))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(resp.status(), CheckStatus::Pass);
    assert_eq!(
        resp.message.as_deref(),
        Some("API health endpoint responded with HTTP 200")
    );
    assert_eq!(resp.details["statusCode"], 200);
    assert_eq!(resp.details["body"]["version"], "1.4.2");
    assert!(resp.metrics.contains_key("responseTime"));
}

#[tokio::test]
async fn test_api_health_non_200_fails() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/health")
        .with_status(503)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    let config = deployment(None, Some(server.url()));
    let resp = ApiHealthCheck::new(probes().http)
        .check(Arc::new(config))
        .await
        .unwrap();

    assert_eq!(resp.status(), CheckStatus::Fail);
    assert_eq!(resp.details["body"], "upstream unavailable");
}

#[tokio::test]
async fn test_api_health_connection_refused_is_error() {
    let config = deployment(None, Some(format!("http://127.0.0.1:{}", closed_port())));
    let result = ApiHealthCheck::new(probes().http)
        .check(Arc::new(config))
        .await;

    assert!(result.unwrap_err().is_network());
}

#[tokio::test]
async fn test_frontend_redirect_is_reachable() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/app")
        .with_status(301)
        .with_header("location", "/app/index.html")
        .create_async()
        .await;

    let config = deployment(Some(format!("{}/app", server.url())), None);
    let resp = FrontendCheck::new(probes().http)
        .check(Arc::new(config))
        .await
        .unwrap();

    assert_eq!(resp.status(), CheckStatus::Pass);
    assert_eq!(resp.message.as_deref(), Some("Frontend responded with HTTP 301"));
    assert_eq!(resp.metrics["statusCode"], 301.0);
}

#[tokio::test]
async fn test_frontend_not_found_fails() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/")
        .with_status(404)
        .create_async()
        .await;

    let config = deployment(Some(format!("{}/", server.url())), None);
    let resp = FrontendCheck::new(probes().http)
        .check(Arc::new(config))
        .await
        .unwrap();

    assert_eq!(resp.status(), CheckStatus::Fail);
}

#[tokio::test]
async fn test_cors_wildcard_passes() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("OPTIONS", "/health")
        .match_header("origin", "https://shop.example.com")
        .match_header("access-control-request-method", "GET")
        .with_status(204)
        .with_header("access-control-allow-origin", "*")
        .with_header("access-control-allow-methods", "GET,OPTIONS")
        .create_async()
        .await;

    let config = deployment(
        Some("https://shop.example.com".into()),
        Some(server.url()),
    );
    let resp = CorsCheck::new(probes().http)
        .check(Arc::new(config))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(resp.status(), CheckStatus::Pass);
    assert_eq!(resp.details["allowOrigin"], "*");
    assert_eq!(resp.details["statusCode"], 204);
}

#[tokio::test]
async fn test_cors_wrong_origin_fails() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("OPTIONS", "/health")
        .with_status(204)
        .with_header("access-control-allow-origin", "https://admin.example.com")
        .create_async()
        .await;

    let config = deployment(
        Some("https://shop.example.com".into()),
        Some(server.url()),
    );
    let resp = CorsCheck::new(probes().http)
        .check(Arc::new(config))
        .await
        .unwrap();

    assert_eq!(resp.status(), CheckStatus::Fail);
    assert_eq!(
        resp.message.as_deref(),
        Some("CORS misconfigured: origin https://shop.example.com not allowed")
    );
}

#[tokio::test]
async fn test_cors_transport_error_is_failed_verdict() {
    let config = deployment(
        Some("https://shop.example.com".into()),
        Some(format!("http://127.0.0.1:{}", closed_port())),
    );
    let resp = CorsCheck::new(probes().http)
        .check(Arc::new(config))
        .await
        .unwrap();

    assert_eq!(resp.status(), CheckStatus::Fail);
    assert!(resp.message.unwrap().starts_with("CORS check failed:"));
    assert!(resp.details.contains_key("error"));
}

#[tokio::test]
async fn test_performance_baseline() {
    let mut server = mockito::Server::new_async().await;
    let _frontend = server
        .mock("GET", "/app")
        .with_status(200)
        .with_body("<html></html>")
        .create_async()
        .await;
    let _api = server
        .mock("GET", "/health")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let config = deployment(Some(format!("{}/app", server.url())), Some(server.url()));
    let resp = PerformanceCheck::new(probes().http)
        .check(Arc::new(config))
        .await
        .unwrap();

    assert_eq!(resp.status(), CheckStatus::Pass);
    assert_eq!(resp.details["checks"][0]["name"], "frontend");
    assert_eq!(resp.details["checks"][1]["name"], "api");
    assert!(resp.metrics["maxResponseTime"] >= resp.metrics["averageResponseTime"]);
}
