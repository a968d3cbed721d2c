//! Network probes used by the built-in checks.

mod http;
mod tls;

pub use http::{HttpProbe, HttpResponse};
pub use tls::{certificate_expiry, CertificateExpiry, CertificateInfo, TlsProbe};
