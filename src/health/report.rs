//! Human-readable run summary.

use std::fmt::Write;

use super::registry::CheckRegistry;
use super::status::{CheckOutcome, CheckStatus, HealthReport, OverallStatus};

/// Renders reports with per-check lines in registry order, regardless of the
/// order checks completed in.
pub struct Reporter<'a> {
    registry: &'a CheckRegistry,
}

impl<'a> Reporter<'a> {
    pub fn new(registry: &'a CheckRegistry) -> Self {
        Self { registry }
    }

    /// Render the summary header followed by one line per check.
    pub fn render(&self, report: &HealthReport) -> String {
        let mut out = String::new();

        // Writing to a String cannot fail
        let _ = writeln!(out, "Health Check Summary ({})", report.deployment_id);
        let _ = writeln!(out, "════════════════════");
        let _ = writeln!(
            out,
            "Overall Status: {} {}",
            overall_glyph(report.overall),
            report.overall.as_str().to_uppercase()
        );
        let _ = writeln!(out, "Health Score: {}/100", report.score);
        let _ = writeln!(out, "Duration: {}ms", report.duration_ms);
        let _ = writeln!(
            out,
            "Checks: {} passed, {} failed, {} warnings",
            report.passed, report.failed, report.warnings
        );

        if report.critical_failures > 0 {
            let _ = writeln!(out, "Critical failures: {}", report.critical_failures);
        }
        if !report.skipped.is_empty() {
            let _ = writeln!(out, "Not run: {}", report.skipped.join(", "));
        }
        if let Some(ref error) = report.error {
            let _ = writeln!(out, "Error: {}", error);
        }

        if !report.checks.is_empty() {
            out.push('\n');
        }
        for outcome in self.ordered(report) {
            let _ = writeln!(out, "{}", Self::check_line(outcome));
        }

        out
    }

    /// One line for a single check: glyph, name, message, duration.
    pub fn check_line(outcome: &CheckOutcome) -> String {
        let mut line = format!(
            "  {} {}: {}",
            status_glyph(outcome.status),
            outcome.name,
            outcome.message
        );
        if outcome.duration_ms > 0 {
            let _ = write!(line, " ({}ms)", outcome.duration_ms);
        }
        line
    }

    /// Outcomes sorted by registry position; unknown names go last, by name.
    fn ordered<'r>(&self, report: &'r HealthReport) -> Vec<&'r CheckOutcome> {
        let order: Vec<&str> = self
            .registry
            .get_all()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        let mut outcomes: Vec<&CheckOutcome> = report.checks.iter().collect();
        outcomes.sort_by(|a, b| {
            let pa = order.iter().position(|n| *n == a.name).unwrap_or(usize::MAX);
            let pb = order.iter().position(|n| *n == b.name).unwrap_or(usize::MAX);
            pa.cmp(&pb).then_with(|| a.name.cmp(&b.name))
        });
        outcomes
    }
}

fn status_glyph(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "✅",
        CheckStatus::Warning => "⚠️",
        CheckStatus::Fail => "❌",
    }
}

fn overall_glyph(status: OverallStatus) -> &'static str {
    match status {
        OverallStatus::Healthy => "✅",
        OverallStatus::Degraded => "⚠️",
        OverallStatus::Unhealthy => "❌",
        OverallStatus::Critical => "🚨",
        OverallStatus::Error => "❓",
    }
}
