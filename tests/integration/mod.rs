//! Integration tests for deploy_health
//!
//! Built-in checks run against local mock servers: mockito for HTTP
//! endpoints and a rustls listener with generated certificates for TLS.
//! No external network access is needed.
//!
//! Run with: cargo test --test integration

mod helpers;

mod builtin_checks;
mod orchestration;
mod tls_certificates;
