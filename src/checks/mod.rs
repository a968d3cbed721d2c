//! Built-in deployment checks.
//!
//! | Check                       | Critical | Category      |
//! |-----------------------------|----------|---------------|
//! | `frontend_accessibility`    | yes      | frontend      |
//! | `api_health_endpoint`       | yes      | api           |
//! | `database_connectivity`     | yes      | database      |
//! | `cors_configuration`        | no       | api           |
//! | `ssl_certificate`           | no       | security      |
//! | `performance_baseline`      | no       | performance   |
//! | `environment_configuration` | yes      | configuration |
//!
//! Checks whose target is not configured for a deployment return a
//! skipped response, which scores as a pass.

mod api;
mod cors;
mod database;
mod environment;
mod frontend;
mod performance;
mod tls;

use std::sync::Arc;
use std::time::Duration;

pub use api::ApiHealthCheck;
pub use cors::{evaluate_cors, CorsCheck};
pub use database::{DatabaseCheck, DatabaseProbe, DatabaseStatus, StaticDatabaseProbe};
pub use environment::EnvironmentCheck;
pub use frontend::FrontendCheck;
pub use performance::{evaluate_performance, EndpointTiming, PerformanceCheck};
pub use tls::{evaluate_certificates, TlsCertificateCheck};

use crate::health::{CheckError, CheckOptions, CheckRegistry, RegistryError};
use crate::probe::{HttpProbe, TlsProbe};

pub const FRONTEND_ACCESSIBILITY: &str = "frontend_accessibility";
pub const API_HEALTH_ENDPOINT: &str = "api_health_endpoint";
pub const DATABASE_CONNECTIVITY: &str = "database_connectivity";
pub const CORS_CONFIGURATION: &str = "cors_configuration";
pub const SSL_CERTIFICATE: &str = "ssl_certificate";
pub const PERFORMANCE_BASELINE: &str = "performance_baseline";
pub const ENVIRONMENT_CONFIGURATION: &str = "environment_configuration";

/// Names of every built-in check.
pub const BUILTIN_CHECKS: [&str; 7] = [
    FRONTEND_ACCESSIBILITY,
    API_HEALTH_ENDPOINT,
    DATABASE_CONNECTIVITY,
    CORS_CONFIGURATION,
    SSL_CERTIFICATE,
    PERFORMANCE_BASELINE,
    ENVIRONMENT_CONFIGURATION,
];

/// Shared clients the built-in checks probe with.
#[derive(Clone)]
pub struct BuiltinProbes {
    pub http: HttpProbe,
    pub tls: TlsProbe,
    pub database: Arc<dyn DatabaseProbe>,
}

impl BuiltinProbes {
    /// Probes whose individual requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, CheckError> {
        Ok(Self {
            http: HttpProbe::new(timeout)?,
            tls: TlsProbe::new(timeout)?,
            database: Arc::new(StaticDatabaseProbe::default()),
        })
    }

    /// Use a real database probe instead of the static stand-in.
    pub fn with_database(mut self, probe: impl DatabaseProbe + 'static) -> Self {
        self.database = Arc::new(probe);
        self
    }
}

/// Register all built-in checks with their default policies.
pub fn register_builtin_checks(
    registry: &mut CheckRegistry,
    probes: BuiltinProbes,
) -> Result<(), RegistryError> {
    registry.register(
        FRONTEND_ACCESSIBILITY,
        FrontendCheck::new(probes.http.clone()),
        CheckOptions::new()
            .critical(true)
            .category("frontend")
            .description("Check if frontend is accessible"),
    )?;
    registry.register(
        API_HEALTH_ENDPOINT,
        ApiHealthCheck::new(probes.http.clone()),
        CheckOptions::new()
            .critical(true)
            .category("api")
            .description("Check API health endpoint"),
    )?;
    registry.register(
        DATABASE_CONNECTIVITY,
        DatabaseCheck::new(probes.database),
        CheckOptions::new()
            .critical(true)
            .category("database")
            .description("Verify database connectivity"),
    )?;
    registry.register(
        CORS_CONFIGURATION,
        CorsCheck::new(probes.http.clone()),
        CheckOptions::new()
            .non_critical()
            .category("api")
            .description("Verify CORS configuration"),
    )?;
    registry.register(
        SSL_CERTIFICATE,
        TlsCertificateCheck::new(probes.tls),
        CheckOptions::new()
            .non_critical()
            .category("security")
            .description("Check SSL certificate validity"),
    )?;
    registry.register(
        PERFORMANCE_BASELINE,
        PerformanceCheck::new(probes.http),
        CheckOptions::new()
            .non_critical()
            .category("performance")
            .description("Check system performance baselines"),
    )?;
    registry.register(
        ENVIRONMENT_CONFIGURATION,
        EnvironmentCheck,
        CheckOptions::new()
            .critical(true)
            .category("configuration")
            .description("Validate environment configuration"),
    )?;

    tracing::debug!(count = BUILTIN_CHECKS.len(), "registered built-in checks");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_builtin_checks() {
        let mut registry = CheckRegistry::default();
        register_builtin_checks(&mut registry, BuiltinProbes::new(Duration::from_secs(5)).unwrap())
            .unwrap();

        assert_eq!(registry.len(), BUILTIN_CHECKS.len());
        for name in BUILTIN_CHECKS {
            assert!(registry.contains(name), "missing {}", name);
        }

        let order: Vec<&str> = registry.get_all().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            order,
            vec![
                API_HEALTH_ENDPOINT,
                DATABASE_CONNECTIVITY,
                ENVIRONMENT_CONFIGURATION,
                FRONTEND_ACCESSIBILITY,
                CORS_CONFIGURATION,
                PERFORMANCE_BASELINE,
                SSL_CERTIFICATE,
            ]
        );

        let tls = registry.get(SSL_CERTIFICATE).unwrap();
        assert!(!tls.critical);
        assert_eq!(tls.category, "security");
    }

    #[test]
    fn test_register_twice_is_rejected() {
        let mut registry = CheckRegistry::default();
        let probes = BuiltinProbes::new(Duration::from_secs(5)).unwrap();
        register_builtin_checks(&mut registry, probes.clone()).unwrap();

        let err = register_builtin_checks(&mut registry, probes).unwrap_err();
        assert_eq!(
            err,
            RegistryError::Duplicate {
                name: FRONTEND_ACCESSIBILITY.to_string()
            }
        );
    }
}
