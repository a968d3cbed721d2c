//! End-to-end runs of the built-in check set

use std::sync::Arc;

use deploy_health::checks::{
    register_builtin_checks, API_HEALTH_ENDPOINT, BUILTIN_CHECKS, CORS_CONFIGURATION,
    DATABASE_CONNECTIVITY, SSL_CERTIFICATE,
};
use deploy_health::config::ExecutionMode;
use deploy_health::health::{CheckRegistry, CheckStatus, Orchestrator, Reporter};
use deploy_health::OverallStatus;

use crate::helpers::{deployment, fast_config, probes};

async fn healthy_server() -> (mockito::ServerGuard, Vec<mockito::Mock>) {
    let mut server = mockito::Server::new_async().await;
    let mocks = vec![
        server
            .mock("GET", "/app")
            .with_status(200)
            .with_body("<html></html>")
            .create_async()
            .await,
        server
            .mock("GET", "/health")
            .with_status(200)
            .with_body(r#"{"status":"ok"}"#)
            .create_async()
            .await,
        server
            .mock("OPTIONS", "/health")
            .with_status(204)
            .with_header("access-control-allow-origin", "*")
            .create_async()
            .await,
    ];
    (server, mocks)
}

fn orchestrator(config: deploy_health::config::OrchestratorConfig) -> Orchestrator {
    let mut registry = CheckRegistry::new(&config);
    register_builtin_checks(&mut registry, probes()).unwrap();
    Orchestrator::new(Arc::new(registry), config)
}

#[tokio::test]
async fn test_healthy_deployment() {
    let (server, _mocks) = healthy_server().await;
    let config = deployment(Some(format!("{}/app", server.url())), Some(server.url()));

    let orchestrator = orchestrator(fast_config(2));
    let report = orchestrator.execute_health_checks(&config, "deploy-100").await;

    assert_eq!(report.overall, OverallStatus::Healthy);
    assert_eq!(report.total_checks, BUILTIN_CHECKS.len());
    assert_eq!(report.passed, BUILTIN_CHECKS.len());
    // 4 critical (x2) and 3 non-critical (x1) passes: 1100 / 1400
    assert_eq!(report.score, 79);
    assert!(!report.should_block_promotion());

    // Plain HTTP endpoints leave nothing for the certificate check
    let tls = report.check(SSL_CERTIFICATE).unwrap();
    assert_eq!(tls.status, CheckStatus::Pass);
    assert_eq!(tls.message, "No HTTPS URLs to check");

    let db = report.check(DATABASE_CONNECTIVITY).unwrap();
    assert_eq!(db.category, "database");
    assert_eq!(db.metrics["connectionTime"], 45.0);
}

#[tokio::test]
async fn test_report_json_in_registry_order() {
    let (server, _mocks) = healthy_server().await;
    let config = deployment(Some(format!("{}/app", server.url())), Some(server.url()));

    let orchestrator = orchestrator(fast_config(1));
    let report = orchestrator.execute_health_checks(&config, "deploy-101").await;

    let json = serde_json::to_string(&report).unwrap();
    let positions: Vec<usize> = orchestrator
        .registry()
        .get_all()
        .iter()
        .map(|c| json.find(&format!("\"{}\":", c.name)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    let value = report.to_json();
    assert_eq!(value["deploymentId"], "deploy-101");
    assert_eq!(value["overall"], "healthy");
    assert_eq!(value["mode"], "parallel");
    assert_eq!(value["checks"][CORS_CONFIGURATION]["status"], "pass");
    assert_eq!(value["checks"][CORS_CONFIGURATION]["critical"], false);

    let summary = Reporter::new(orchestrator.registry()).render(&report);
    assert!(summary.contains("Overall Status: ✅ HEALTHY"));
    assert!(summary.contains("Health Score: 79/100"));
}

#[tokio::test]
async fn test_api_down_in_sequential_mode_stops_early() {
    let mut server = mockito::Server::new_async().await;
    let api = server
        .mock("GET", "/health")
        .with_status(503)
        .expect(2)
        .create_async()
        .await;

    let config = deployment(Some(format!("{}/app", server.url())), Some(server.url()));
    let orchestrator = orchestrator(fast_config(2).with_mode(ExecutionMode::Sequential));
    let report = orchestrator.execute_health_checks(&config, "deploy-102").await;

    // Both attempts were made before giving up
    api.assert_async().await;

    assert_eq!(report.overall, OverallStatus::Critical);
    assert_eq!(report.total_checks, 1);
    assert_eq!(report.critical_failures, 1);
    assert_eq!(report.skipped.len(), BUILTIN_CHECKS.len() - 1);
    assert!(report.should_block_promotion());

    let outcome = report.check(API_HEALTH_ENDPOINT).unwrap();
    assert_eq!(outcome.attempt, 2);
    assert!(!outcome.error);
    assert_eq!(
        outcome.message,
        "API health endpoint responded with HTTP 503"
    );
}

#[tokio::test]
async fn test_unreachable_api_is_terminal_error() {
    let (server, _mocks) = healthy_server().await;
    let dead_api = format!("http://127.0.0.1:{}", crate::helpers::closed_port());
    let config = deployment(Some(format!("{}/app", server.url())), Some(dead_api));

    let orchestrator = orchestrator(fast_config(2));
    let report = orchestrator.execute_health_checks(&config, "deploy-103").await;

    let api = report.check(API_HEALTH_ENDPOINT).unwrap();
    assert_eq!(api.status, CheckStatus::Fail);
    assert!(api.error);
    assert_eq!(api.attempt, 2);
    assert!(api.details.contains_key("error"));

    // The CORS check reports its own transport failure
    let cors = report.check(CORS_CONFIGURATION).unwrap();
    assert_eq!(cors.status, CheckStatus::Fail);
    assert!(!cors.error);

    assert_eq!(report.overall, OverallStatus::Critical);
    assert_eq!(report.total_checks, BUILTIN_CHECKS.len());
}

#[tokio::test]
async fn test_skip_list() {
    let (server, _mocks) = healthy_server().await;
    let config = deployment(Some(format!("{}/app", server.url())), Some(server.url()));

    let orchestrator = orchestrator(fast_config(1).with_skip(CORS_CONFIGURATION));
    let report = orchestrator.execute_health_checks(&config, "deploy-104").await;

    assert!(report.check(CORS_CONFIGURATION).is_none());
    assert_eq!(report.total_checks, BUILTIN_CHECKS.len() - 1);
    assert_eq!(report.skipped, vec![CORS_CONFIGURATION.to_string()]);
}
