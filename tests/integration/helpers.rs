//! Test helpers and utilities

use std::sync::Arc;
use std::time::Duration;

use deploy_health::checks::BuiltinProbes;
use deploy_health::config::OrchestratorConfig;
use deploy_health::DeploymentConfig;
use rcgen::{CertificateParams, DnType, KeyPair};
use time::OffsetDateTime;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio_rustls::rustls::crypto::ring;
use tokio_rustls::rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::TlsAcceptor;

/// Per-request timeout for probes in tests.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Probes with a short timeout and the static database stand-in.
pub fn probes() -> BuiltinProbes {
    BuiltinProbes::new(PROBE_TIMEOUT).expect("Failed to create probes")
}

/// Orchestrator settings with quick retries.
pub fn fast_config(attempts: u32) -> OrchestratorConfig {
    let mut config = OrchestratorConfig::default().with_retry_delay(Duration::from_millis(10));
    config.default_retry_count = attempts;
    config.default_timeout = PROBE_TIMEOUT;
    config
}

/// A staging deployment whose frontend and API live at the given URLs.
///
/// CDN distribution and API gateway ids are set so environment policy passes.
pub fn deployment(frontend: Option<String>, api: Option<String>) -> DeploymentConfig {
    let mut config = DeploymentConfig::new("staging");
    config.region = Some("eu-west-1".into());
    config.frontend.url = frontend;
    config.frontend.cdn_distribution_id = Some("E2TESTDIST".into());
    config.backend.api_url = api;
    config.backend.api_gateway_id = Some("a1b2c3d4".into());
    config.database.tables = vec!["products".into(), "orders".into()];
    config
}

/// A local port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    listener.local_addr().expect("No local address").port()
}

/// Start a TLS listener whose self-signed certificate expires after
/// `valid_for`. Returns its `https://` URL.
///
/// The server completes the handshake and closes the connection.
pub async fn spawn_tls_server(valid_for: time::Duration) -> String {
    let key_pair = KeyPair::generate().expect("Failed to generate key");
    let mut params =
        CertificateParams::new(vec!["localhost".to_string()]).expect("Invalid certificate params");
    params.distinguished_name.push(DnType::CommonName, "localhost");
    params.not_before = OffsetDateTime::now_utc() - time::Duration::days(1);
    params.not_after = OffsetDateTime::now_utc() + valid_for;
    let cert = params.self_signed(&key_pair).expect("Failed to sign certificate");

    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));
    let config = ServerConfig::builder_with_provider(Arc::new(ring::default_provider()))
        .with_safe_default_protocol_versions()
        .expect("No protocol versions")
        .with_no_client_auth()
        .with_single_cert(vec![cert.der().clone()], key)
        .expect("Failed to build server config");
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind TLS listener");
    let port = listener.local_addr().expect("No local address").port();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                if let Ok(mut tls) = acceptor.accept(stream).await {
                    let _ = tls.shutdown().await;
                }
            });
        }
    });

    format!("https://127.0.0.1:{}", port)
}
