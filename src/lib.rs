//! deploy_health - post-deployment health check orchestrator.
//!
//! Runs a registry of health checks against a freshly deployed environment
//! and produces a scored [`HealthReport`] a pipeline can use to decide
//! whether to promote, hold or roll back.
//!
//! # Features
//!
//! - **Parallel or sequential runs**: unbounded fan-out (optionally capped),
//!   or one at a time with early termination on critical failure
//! - **Retry and timeout policy**: per-check attempt count and deadline,
//!   fixed delay between attempts
//! - **Weighted scoring**: critical checks count double
//! - **Built-in checks**: frontend, API health, database, CORS, TLS expiry,
//!   latency baseline and environment policy
//! - **Structured logging**: text or JSON lines via tracing
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use deploy_health::checks::{register_builtin_checks, BuiltinProbes};
//! use deploy_health::health::{CheckRegistry, Orchestrator};
//! use deploy_health::{Config, DeploymentConfig};
//!
//! let config = Config::from_env()?;
//! let mut registry = CheckRegistry::new(&config.orchestrator);
//! register_builtin_checks(&mut registry, BuiltinProbes::new(config.orchestrator.default_timeout)?)?;
//!
//! let deployment = DeploymentConfig::from_file("deploy/staging.json")?;
//! let orchestrator = Orchestrator::new(Arc::new(registry), config.orchestrator);
//! let report = orchestrator.execute_health_checks(&deployment, "deploy-42").await;
//! if report.should_block_promotion() {
//!     // roll back
//! }
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars) with optional "-dirty" suffix
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)" or "0.1.0 (abc12345-dirty)"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod checks;
pub mod config;
pub mod deployment;
pub mod health;
pub mod logging;
pub mod probe;

// Re-exports for convenience
pub use config::Config;
pub use deployment::DeploymentConfig;
pub use health::{HealthReport, Orchestrator, OverallStatus};
