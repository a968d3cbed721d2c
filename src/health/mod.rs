//! Post-deploy health check engine.
//!
//! A [`CheckRegistry`] holds named checks and their policies. The
//! [`Orchestrator`] runs them against a [`DeploymentConfig`], and the
//! [`ResultAggregator`] folds the outcomes into a [`HealthReport`] with a
//! weighted score and an overall status.
//!
//! # Status ladder
//!
//! | overall     | condition                       |
//! |-------------|---------------------------------|
//! | `critical`  | any critical check failed       |
//! | `unhealthy` | any check failed                |
//! | `degraded`  | any check warned                |
//! | `healthy`   | everything passed (or no checks) |
//!
//! A pipeline should abort or roll back on `critical`, `unhealthy` or
//! `error`; that decision is left to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use deploy_health::health::{check_fn, CheckOptions, CheckRegistry, CheckResponse, Orchestrator};
//!
//! let mut registry = CheckRegistry::new(&config.orchestrator);
//! registry.register(
//!     "queue_depth",
//!     check_fn(|_| async { Ok(CheckResponse::pass("queue drained")) }),
//!     CheckOptions::new().non_critical().category("queue"),
//! )?;
//!
//! let orchestrator = Orchestrator::new(Arc::new(registry), config.orchestrator);
//! let report = orchestrator.execute_health_checks(&deployment, "deploy-42").await;
//! ```
//!
//! [`DeploymentConfig`]: crate::deployment::DeploymentConfig

mod check;
mod error;
mod orchestrator;
mod registry;
mod report;
mod score;
mod status;

pub use check::{check_fn, CheckResponse, FnCheck, HealthCheck};
pub use error::{CheckError, OrchestrationError, RegistryError};
pub use orchestrator::{execute_check, Orchestrator};
pub use registry::{CheckDefinition, CheckOptions, CheckRegistry, DEFAULT_CATEGORY};
pub use report::Reporter;
pub use score::{ResultAggregator, RunSummary, Tally};
pub use status::{CheckOutcome, CheckStatus, Details, HealthReport, Metrics, OverallStatus};

pub(crate) use status::timestamp_now;
