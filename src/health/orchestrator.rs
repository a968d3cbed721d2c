//! Health check orchestration.
//!
//! Runs the registered checks against a deployment, applying each check's
//! timeout and retry policy, and folds the outcomes into a [`HealthReport`].
//!
//! # Execution modes
//!
//! - **Parallel**: every check is spawned as its own task and the run waits
//!   for all of them to settle. A failing or panicking check never cancels
//!   its siblings.
//! - **Sequential**: checks run one at a time in registry order. The first
//!   critical check to fail stops the run; later checks are reported as
//!   skipped and left out of the results.
//!
//! # Per-check policy
//!
//! ```text
//! attempt 1 ──▶ timeout(check) ──▶ pass / warning ──▶ done
//!                    │
//!                    └── error / timeout / fail ──▶ sleep(retry_delay) ──▶ attempt 2 ...
//! ```
//!
//! A timed-out attempt is dropped at the deadline, which cancels whatever
//! I/O it was awaiting.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::check::CheckResponse;
use super::registry::{CheckDefinition, CheckRegistry};
use super::report::Reporter;
use super::score::{ResultAggregator, RunSummary};
use super::status::{millis, timestamp_now, CheckOutcome, CheckStatus, Details, HealthReport, Metrics};
use super::{CheckError, OrchestrationError};
use crate::config::{ExecutionMode, OrchestratorConfig};
use crate::deployment::DeploymentConfig;

/// Outcomes of a run, plus checks that were selected but never attempted.
struct RunOutcome {
    outcomes: Vec<CheckOutcome>,
    not_run: Vec<String>,
}

/// Executes registered checks against deployments.
///
/// Holds no per-run state, so one orchestrator can serve concurrent runs
/// for different deployments.
pub struct Orchestrator {
    registry: Arc<CheckRegistry>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(registry: Arc<CheckRegistry>, config: OrchestratorConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run every selected check and report on the deployment.
    ///
    /// Never fails: check errors become `fail` outcomes, and orchestration
    /// errors become a report with overall status `error`.
    pub async fn execute_health_checks(
        &self,
        config: &DeploymentConfig,
        deployment_id: &str,
    ) -> HealthReport {
        let started = Instant::now();
        let timestamp = timestamp_now();
        let mode = self.config.mode;
        let (selected, excluded) = self.select_checks();

        info!(
            deployment_id = %deployment_id,
            checks = selected.len(),
            mode = %mode,
            "Executing health checks"
        );

        let result = match config.validate() {
            Err(msg) => Err(OrchestrationError::InvalidConfig(msg)),
            Ok(()) => {
                let config = Arc::new(config.clone());
                match mode {
                    ExecutionMode::Parallel => self.run_parallel(&selected, config).await,
                    ExecutionMode::Sequential => self.run_sequential(&selected, config).await,
                }
            }
        };

        let run = RunSummary {
            deployment_id: deployment_id.to_string(),
            timestamp,
            mode,
            elapsed: started.elapsed(),
        };

        let report = match result {
            Ok(mut run_outcome) => {
                let mut skipped = excluded;
                skipped.append(&mut run_outcome.not_run);
                ResultAggregator::aggregate(run, run_outcome.outcomes, skipped)
            }
            Err(e) => {
                warn!(deployment_id = %deployment_id, error = %e, "Health check execution failed");
                ResultAggregator::errored(run, e.to_string())
            }
        };

        self.log_report(&report);
        report
    }

    /// Registry-ordered checks to run, and the names excluded by config.
    fn select_checks(&self) -> (Vec<CheckDefinition>, Vec<String>) {
        let mut selected = Vec::new();
        let mut excluded = Vec::new();
        for check in self.registry.get_all() {
            if self.config.skip.iter().any(|s| *s == check.name) {
                excluded.push(check.name.clone());
            } else {
                selected.push(check.clone());
            }
        }
        (selected, excluded)
    }

    async fn run_parallel(
        &self,
        checks: &[CheckDefinition],
        config: Arc<DeploymentConfig>,
    ) -> Result<RunOutcome, OrchestrationError> {
        let limiter = self.config.max_concurrency.map(|n| Arc::new(Semaphore::new(n)));
        let started = Instant::now();

        let handles: Vec<(&CheckDefinition, JoinHandle<CheckOutcome>)> = checks
            .iter()
            .map(|check| {
                let handle = self.spawn_check(check, Arc::clone(&config), limiter.clone());
                (check, handle)
            })
            .collect();

        // Every task is already running; awaiting in registry order keeps
        // the result order stable without serializing the work.
        let mut outcomes = Vec::with_capacity(handles.len());
        for (check, handle) in handles {
            outcomes.push(settle(check, handle.await, started)?);
        }

        Ok(RunOutcome {
            outcomes,
            not_run: Vec::new(),
        })
    }

    async fn run_sequential(
        &self,
        checks: &[CheckDefinition],
        config: Arc<DeploymentConfig>,
    ) -> Result<RunOutcome, OrchestrationError> {
        let mut outcomes = Vec::with_capacity(checks.len());

        for (index, check) in checks.iter().enumerate() {
            let started = Instant::now();
            let handle = self.spawn_check(check, Arc::clone(&config), None);
            let outcome = settle(check, handle.await, started)?;
            let stop = outcome.is_critical_failure();
            outcomes.push(outcome);

            if stop {
                let not_run: Vec<String> =
                    checks[index + 1..].iter().map(|c| c.name.clone()).collect();
                warn!(
                    check = %check.name,
                    remaining = not_run.len(),
                    "Critical health check failed, terminating remaining checks"
                );
                return Ok(RunOutcome { outcomes, not_run });
            }
        }

        Ok(RunOutcome {
            outcomes,
            not_run: Vec::new(),
        })
    }

    fn spawn_check(
        &self,
        check: &CheckDefinition,
        config: Arc<DeploymentConfig>,
        limiter: Option<Arc<Semaphore>>,
    ) -> JoinHandle<CheckOutcome> {
        let check = check.clone();
        let retry_delay = self.config.retry_delay;
        tokio::spawn(async move {
            // Held for the whole retry loop so a bounded pool counts checks, not attempts
            let _permit = match limiter {
                Some(sem) => sem.acquire_owned().await.ok(),
                None => None,
            };
            execute_check(&check, config, retry_delay).await
        })
    }

    fn log_report(&self, report: &HealthReport) {
        info!(
            deployment_id = %report.deployment_id,
            overall = %report.overall,
            score = report.score,
            duration_ms = report.duration_ms,
            passed = report.passed,
            failed = report.failed,
            warnings = report.warnings,
            "Health check summary"
        );
        for line in Reporter::new(&self.registry).render(report).lines() {
            debug!(target: "check", "{}", line);
        }
    }
}

/// Run one check under its timeout and retry policy.
///
/// Returns as soon as an attempt passes or warns. Errors, timeouts and
/// `fail` verdicts are retried after `retry_delay` until attempts run out.
pub async fn execute_check(
    check: &CheckDefinition,
    config: Arc<DeploymentConfig>,
    retry_delay: Duration,
) -> CheckOutcome {
    info!(target: "check", check = %check.name, "Running health check");

    let started = Instant::now();
    let mut last_error = None;

    for attempt in 1..=check.retry_count {
        let call = AssertUnwindSafe(check.check.check(Arc::clone(&config))).catch_unwind();

        match tokio::time::timeout(check.timeout, call).await {
            Ok(Ok(Ok(response))) => {
                if response.status() != CheckStatus::Fail || attempt == check.retry_count {
                    return outcome_from_response(check, response, attempt, started);
                }
                debug!(
                    target: "check",
                    check = %check.name,
                    attempt,
                    message = %response.message_or_default(),
                    "Health check reported failure"
                );
                last_error = None;
            }
            Ok(Ok(Err(e))) => last_error = Some(e),
            Ok(Err(panic)) => last_error = Some(CheckError::Panicked(panic_message(panic))),
            Err(_) => {
                last_error = Some(CheckError::Timeout {
                    check: check.name.clone(),
                    timeout: check.timeout,
                })
            }
        }

        if attempt < check.retry_count {
            info!(
                target: "check",
                check = %check.name,
                attempt = attempt + 1,
                max_attempts = check.retry_count,
                delay_ms = millis(retry_delay),
                "Retrying health check"
            );
            tokio::time::sleep(retry_delay).await;
        }
    }

    let error = last_error.unwrap_or_else(|| CheckError::Other("health check never ran".into()));
    warn!(
        target: "check",
        check = %check.name,
        attempts = check.retry_count,
        error = %error,
        "Health check failed"
    );
    failure_outcome(check, &error, check.retry_count, started)
}

fn outcome_from_response(
    check: &CheckDefinition,
    response: CheckResponse,
    attempt: u32,
    started: Instant,
) -> CheckOutcome {
    CheckOutcome {
        name: check.name.clone(),
        status: response.status(),
        message: response.message_or_default(),
        details: response.details,
        duration_ms: millis(started.elapsed()),
        attempt,
        critical: check.critical,
        category: check.category.clone(),
        timestamp: timestamp_now(),
        metrics: response.metrics,
        error: false,
    }
}

/// Terminal `fail` for a check whose attempts all errored.
fn failure_outcome(
    check: &CheckDefinition,
    error: &CheckError,
    attempt: u32,
    started: Instant,
) -> CheckOutcome {
    let message = error.to_string();
    let mut details = Details::new();
    details.insert("error".to_string(), serde_json::Value::String(message.clone()));

    CheckOutcome {
        name: check.name.clone(),
        status: CheckStatus::Fail,
        message,
        details,
        duration_ms: millis(started.elapsed()),
        attempt,
        critical: check.critical,
        category: check.category.clone(),
        timestamp: timestamp_now(),
        metrics: Metrics::new(),
        error: true,
    }
}

/// Map a finished task onto an outcome; only runtime cancellation escapes.
///
/// A panic that escapes the task counts as the check's last attempt, timed
/// from `started` (when the task was spawned).
fn settle(
    check: &CheckDefinition,
    joined: Result<CheckOutcome, JoinError>,
    started: Instant,
) -> Result<CheckOutcome, OrchestrationError> {
    match joined {
        Ok(outcome) => Ok(outcome),
        Err(e) if e.is_panic() => {
            let error = CheckError::Panicked(panic_message(e.into_panic()));
            Ok(failure_outcome(check, &error, check.retry_count, started))
        }
        Err(_) => Err(OrchestrationError::Cancelled {
            check: check.name.clone(),
        }),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
