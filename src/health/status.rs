//! Outcome and report types.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::config::ExecutionMode;

/// Free-form per-check details (`url`, `statusCode`, `error`, ...).
pub type Details = BTreeMap<String, serde_json::Value>;

/// Numeric per-check measurements (`responseTime`, `minimumExpiry`, ...).
pub type Metrics = BTreeMap<String, f64>;

/// Result tier of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warning,
    Fail,
}

impl CheckStatus {
    /// Points awarded before criticality weighting.
    pub fn points(self) -> u64 {
        match self {
            CheckStatus::Pass => 100,
            CheckStatus::Warning => 70,
            CheckStatus::Fail => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Pass => "pass",
            CheckStatus::Warning => "warning",
            CheckStatus::Fail => "fail",
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall classification of a run, from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Degraded,
    Unhealthy,
    Critical,
    /// The orchestration itself failed; no check results are trustworthy.
    Error,
}

impl OverallStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OverallStatus::Healthy => "healthy",
            OverallStatus::Degraded => "degraded",
            OverallStatus::Unhealthy => "unhealthy",
            OverallStatus::Critical => "critical",
            OverallStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of executing one check (after retries).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    /// Registered check name
    #[serde(skip)]
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub details: Details,
    /// Wall-clock time across all attempts, including retry delays
    pub duration_ms: u64,
    /// Attempt that produced this outcome (1-based)
    pub attempt: u32,
    pub critical: bool,
    pub category: String,
    /// RFC 3339 completion time
    pub timestamp: String,
    pub metrics: Metrics,
    /// Set when every attempt errored or timed out
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

impl CheckOutcome {
    pub fn is_pass(&self) -> bool {
        self.status == CheckStatus::Pass
    }

    pub fn is_fail(&self) -> bool {
        self.status == CheckStatus::Fail
    }

    pub fn is_critical_failure(&self) -> bool {
        self.critical && self.is_fail()
    }
}

/// Complete result of one orchestration run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub deployment_id: String,
    /// RFC 3339 start time of the run
    pub timestamp: String,
    pub mode: ExecutionMode,
    pub total_checks: usize,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
    pub critical_failures: usize,
    pub duration_ms: u64,
    /// Outcomes in registry order, serialized as a name-keyed object
    #[serde(serialize_with = "serialize_outcomes")]
    pub checks: Vec<CheckOutcome>,
    /// Selected checks that were never attempted
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    pub overall: OverallStatus,
    /// Weighted score, 0-100
    pub score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    /// Look up a check outcome by name.
    pub fn check(&self, name: &str) -> Option<&CheckOutcome> {
        self.checks.iter().find(|c| c.name == name)
    }

    /// Returns true if a deployment pipeline should abort or roll back.
    pub fn should_block_promotion(&self) -> bool {
        matches!(
            self.overall,
            OverallStatus::Critical | OverallStatus::Unhealthy | OverallStatus::Error
        )
    }

    /// Serialize to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

fn serialize_outcomes<S: Serializer>(
    outcomes: &[CheckOutcome],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(outcomes.len()))?;
    for outcome in outcomes {
        map.serialize_entry(&outcome.name, outcome)?;
    }
    map.end()
}

/// Current UTC time as RFC 3339.
pub(crate) fn timestamp_now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Duration in whole milliseconds, saturating.
pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
