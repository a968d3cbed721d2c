use std::sync::Arc;

use async_trait::async_trait;

use crate::deployment::DeploymentConfig;
use crate::health::{CheckError, CheckResponse, HealthCheck};

/// Result of a database connectivity probe.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseStatus {
    pub reachable: bool,
    pub connection_time_ms: f64,
    pub message: String,
}

/// Connectivity test against the deployment's database.
///
/// The orchestrator ships no database client; deployments plug in their own.
#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    async fn ping(&self, config: &DeploymentConfig) -> Result<DatabaseStatus, CheckError>;
}

/// Stand-in probe that reports a fixed, reachable connection.
#[derive(Debug, Clone)]
pub struct StaticDatabaseProbe {
    connection_time_ms: f64,
}

impl StaticDatabaseProbe {
    pub fn new(connection_time_ms: f64) -> Self {
        Self { connection_time_ms }
    }
}

impl Default for StaticDatabaseProbe {
    fn default() -> Self {
        Self::new(45.0)
    }
}

#[async_trait]
impl DatabaseProbe for StaticDatabaseProbe {
    async fn ping(&self, _config: &DeploymentConfig) -> Result<DatabaseStatus, CheckError> {
        Ok(DatabaseStatus {
            reachable: true,
            connection_time_ms: self.connection_time_ms,
            message: "Database connectivity verified".to_string(),
        })
    }
}

pub struct DatabaseCheck {
    probe: Arc<dyn DatabaseProbe>,
}

impl DatabaseCheck {
    pub fn new(probe: Arc<dyn DatabaseProbe>) -> Self {
        Self { probe }
    }
}

#[async_trait]
impl HealthCheck for DatabaseCheck {
    async fn check(&self, config: Arc<DeploymentConfig>) -> Result<CheckResponse, CheckError> {
        let status = self.probe.ping(&config).await?;

        Ok(CheckResponse::new(status.reachable, status.message)
            .with_detail("tables", config.database.table_names())
            .with_detail("region", config.region.clone())
            .with_metric("connectionTime", status.connection_time_ms))
    }
}
