//! TLS certificate probe using rustls.
//!
//! Opens a TLS connection and reads the leaf certificate's validity. The
//! chain is deliberately not trusted or rejected: an expired or
//! self-signed certificate must still report its expiry.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::net::TcpStream;
use tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use tokio_rustls::rustls::crypto::{ring, verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use tokio_rustls::rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use tokio_rustls::TlsConnector;

use crate::health::CheckError;

const SECS_PER_DAY: i64 = 86_400;

/// Expiry facts read from one certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateExpiry {
    /// Whole days until `not_after`, rounded up; zero or negative once expired.
    pub days_until_expiry: i64,
    pub not_after: String,
    pub issuer: Option<String>,
    pub subject: Option<String>,
}

/// Per-endpoint certificate report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateInfo {
    pub url: String,
    pub valid: bool,
    pub days_until_expiry: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CertificateInfo {
    fn from_expiry(url: &str, expiry: CertificateExpiry) -> Self {
        Self {
            url: url.to_string(),
            valid: expiry.days_until_expiry > 0,
            days_until_expiry: expiry.days_until_expiry,
            issuer: expiry.issuer,
            subject: expiry.subject,
            expiry_date: Some(expiry.not_after),
            error: None,
        }
    }

    fn failed(url: &str, error: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            valid: false,
            days_until_expiry: 0,
            issuer: None,
            subject: None,
            expiry_date: None,
            error: Some(error.into()),
        }
    }
}

/// Reads peer certificates over TLS.
#[derive(Clone)]
pub struct TlsProbe {
    connector: TlsConnector,
    timeout: Duration,
}

impl TlsProbe {
    pub fn new(timeout: Duration) -> Result<Self, CheckError> {
        let provider = Arc::new(ring::default_provider());
        let config = ClientConfig::builder_with_provider(Arc::clone(&provider))
            .with_safe_default_protocol_versions()
            .map_err(|e| CheckError::Other(format!("TLS configuration error: {}", e)))?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(InspectOnlyVerifier { provider }))
            .with_no_client_auth();

        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            timeout,
        })
    }

    /// Inspect the certificate served at an `https://` URL.
    ///
    /// Connection problems are reported in the result (invalid, 0 days)
    /// rather than as an error.
    pub async fn inspect(&self, url: &str) -> CertificateInfo {
        let result = tokio::time::timeout(self.timeout, self.read_expiry(url)).await;
        match result {
            Ok(Ok(expiry)) => CertificateInfo::from_expiry(url, expiry),
            Ok(Err(e)) => {
                tracing::debug!(url, error = %e, "certificate probe failed");
                CertificateInfo::failed(url, e.to_string())
            }
            Err(_) => CertificateInfo::failed(
                url,
                format!("TLS handshake timed out after {}ms", self.timeout.as_millis()),
            ),
        }
    }

    async fn read_expiry(&self, url: &str) -> Result<CertificateExpiry, CheckError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| CheckError::Tls {
            host: url.to_string(),
            message: format!("invalid URL: {}", e),
        })?;
        let host = parsed
            .host_str()
            .ok_or_else(|| CheckError::Tls {
                host: url.to_string(),
                message: "URL has no host".into(),
            })?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        let port = parsed.port_or_known_default().unwrap_or(443);

        let tls_error = |message: String| CheckError::Tls {
            host: host.clone(),
            message,
        };

        let server_name =
            ServerName::try_from(host.clone()).map_err(|e| tls_error(e.to_string()))?;
        let tcp = TcpStream::connect((host.as_str(), port))
            .await
            .map_err(|e| tls_error(e.to_string()))?;
        let stream = self
            .connector
            .connect(server_name, tcp)
            .await
            .map_err(|e| tls_error(e.to_string()))?;

        let (_, session) = stream.get_ref();
        let leaf = session
            .peer_certificates()
            .and_then(|certs| certs.first())
            .ok_or_else(|| tls_error("No certificate found".into()))?;

        certificate_expiry(leaf.as_ref(), OffsetDateTime::now_utc())
    }
}

/// Parse a DER certificate and compute its remaining validity at `now`.
pub fn certificate_expiry(der: &[u8], now: OffsetDateTime) -> Result<CertificateExpiry, CheckError> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| CheckError::Other(format!("Invalid X.509: {}", e)))?;

    let not_after = cert.validity().not_after;
    let remaining = not_after.timestamp() - now.unix_timestamp();
    // Round up, like a calendar countdown
    let days_until_expiry =
        remaining.div_euclid(SECS_PER_DAY) + i64::from(remaining.rem_euclid(SECS_PER_DAY) > 0);

    let common_name = |name: &x509_parser::x509::X509Name<'_>| {
        name.iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
            .map(str::to_string)
    };

    Ok(CertificateExpiry {
        days_until_expiry,
        not_after: not_after.to_datetime().format(&Rfc3339).unwrap_or_default(),
        issuer: common_name(cert.issuer()),
        subject: common_name(cert.subject()),
    })
}

/// Accepts any chain but still checks handshake signatures, so the peer
/// must hold the key for the certificate it presented.
#[derive(Debug)]
struct InspectOnlyVerifier {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for InspectOnlyVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, tokio_rustls::rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
