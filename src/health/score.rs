//! Result aggregation: counts, weighted score and overall status.

use std::time::Duration;

use super::status::{millis, CheckOutcome, CheckStatus, HealthReport, OverallStatus};
use crate::config::ExecutionMode;

/// Weight of a critical check relative to a non-critical one.
const CRITICAL_WEIGHT: u64 = 2;

/// Per-status counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
    pub critical_failures: usize,
}

/// Turns collected outcomes into a [`HealthReport`].
pub struct ResultAggregator;

impl ResultAggregator {
    /// Count outcomes by status.
    pub fn tally(outcomes: &[CheckOutcome]) -> Tally {
        outcomes.iter().fold(
            Tally {
                total: outcomes.len(),
                ..Default::default()
            },
            |mut tally, outcome| {
                match outcome.status {
                    CheckStatus::Pass => tally.passed += 1,
                    CheckStatus::Warning => tally.warnings += 1,
                    CheckStatus::Fail => {
                        tally.failed += 1;
                        if outcome.critical {
                            tally.critical_failures += 1;
                        }
                    }
                }
                tally
            },
        )
    }

    /// Weighted score in `0..=100`.
    ///
    /// Normalised against every check being critical, so an all-passing set
    /// of non-critical checks tops out at 50. An empty set scores 0.
    pub fn score(outcomes: &[CheckOutcome]) -> u8 {
        if outcomes.is_empty() {
            return 0;
        }

        let earned: u64 = outcomes
            .iter()
            .map(|o| {
                let weight = if o.critical { CRITICAL_WEIGHT } else { 1 };
                o.status.points() * weight
            })
            .sum();
        let max = outcomes.len() as u64 * CheckStatus::Pass.points() * CRITICAL_WEIGHT;

        (earned as f64 / max as f64 * 100.0).round().clamp(0.0, 100.0) as u8
    }

    /// Strict priority ladder over the counts.
    pub fn overall_status(tally: &Tally) -> OverallStatus {
        if tally.critical_failures > 0 {
            OverallStatus::Critical
        } else if tally.failed > 0 {
            OverallStatus::Unhealthy
        } else if tally.warnings > 0 {
            OverallStatus::Degraded
        } else {
            OverallStatus::Healthy
        }
    }

    /// Build the report for a completed run.
    pub fn aggregate(run: RunSummary, outcomes: Vec<CheckOutcome>, skipped: Vec<String>) -> HealthReport {
        let tally = Self::tally(&outcomes);
        HealthReport {
            deployment_id: run.deployment_id,
            timestamp: run.timestamp,
            mode: run.mode,
            total_checks: tally.total,
            passed: tally.passed,
            failed: tally.failed,
            warnings: tally.warnings,
            critical_failures: tally.critical_failures,
            duration_ms: millis(run.elapsed),
            score: Self::score(&outcomes),
            overall: Self::overall_status(&tally),
            checks: outcomes,
            skipped,
            error: None,
        }
    }

    /// Build the report for a run whose orchestration failed.
    pub fn errored(run: RunSummary, error: impl Into<String>) -> HealthReport {
        HealthReport {
            deployment_id: run.deployment_id,
            timestamp: run.timestamp,
            mode: run.mode,
            total_checks: 0,
            passed: 0,
            failed: 0,
            warnings: 0,
            critical_failures: 0,
            duration_ms: millis(run.elapsed),
            checks: Vec::new(),
            skipped: Vec::new(),
            overall: OverallStatus::Error,
            score: 0,
            error: Some(error.into()),
        }
    }
}

/// Run-level facts the aggregator copies into the report.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub deployment_id: String,
    pub timestamp: String,
    pub mode: ExecutionMode,
    /// Wall-clock time of the whole run.
    pub elapsed: Duration,
}
