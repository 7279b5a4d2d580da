//! One-shot usage snapshot, formatted for the `status` command.
//!
//! Pure functions: (UsageSnapshot, OutputFormat) → String.
//! No I/O, no side effects.

use humansize::{format_size, DECIMAL};
use serde::Serialize;

use crate::usage::{UsageEngine, UsageLevel};

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Everything the screen derives from the engine, frozen at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub user_name: String,
    pub plan_name: String,
    #[serde(rename = "totalDataMB")]
    pub total_data_mb: f64,
    #[serde(rename = "usedMB")]
    pub used_mb: f64,
    #[serde(rename = "remainingMB")]
    pub remaining_mb: f64,
    pub percentage_remaining: f64,
    pub level: UsageLevel,
}

impl UsageSnapshot {
    pub fn capture(engine: &UsageEngine) -> Self {
        let plan = engine.plan();
        UsageSnapshot {
            user_name: plan.user_name.clone(),
            plan_name: plan.plan_name.clone(),
            total_data_mb: plan.total_data_mb,
            used_mb: engine.used_mb(),
            remaining_mb: engine.remaining_mb(),
            percentage_remaining: engine.percentage(),
            level: engine.level(),
        }
    }
}

/// Format a snapshot for output.
pub fn format_snapshot(snapshot: &UsageSnapshot, format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => format_human(snapshot),
        OutputFormat::Json => format_json(snapshot),
    }
}

// ============================================================================
// HUMAN FORMAT
// ============================================================================

fn megabytes(mb: f64) -> String {
    format_size((mb.max(0.0) * 1_000_000.0).round() as u64, DECIMAL)
}

fn level_label(level: UsageLevel) -> &'static str {
    match level {
        UsageLevel::Alert => "ALERT",
        UsageLevel::Warning => "warning",
        UsageLevel::Nominal => "ok",
    }
}

fn format_human(snapshot: &UsageSnapshot) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n", snapshot.plan_name));
    out.push_str(&format!("User:       {}\n", snapshot.user_name));
    out.push_str(&format!("Allowance:  {}\n", megabytes(snapshot.total_data_mb)));
    out.push_str(&format!("Used:       {}\n", megabytes(snapshot.used_mb)));
    out.push_str(&format!("Remaining:  {}\n", megabytes(snapshot.remaining_mb)));
    out.push_str(&format!(
        "Status:     {:.0}% remaining ({})\n",
        snapshot.percentage_remaining,
        level_label(snapshot.level)
    ));
    out
}

// ============================================================================
// JSON FORMAT
// ============================================================================

fn format_json(snapshot: &UsageSnapshot) -> String {
    // Plain struct of strings, floats and a unit enum; serialization cannot fail.
    serde_json::to_string_pretty(snapshot).unwrap_or_else(|e| {
        panic!("Failed to serialize snapshot to JSON: {}", e)
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::PlanRecord;

    fn engine(used: f64) -> UsageEngine {
        UsageEngine::new(PlanRecord {
            user_id: "u1".into(),
            user_name: "Alex".into(),
            plan_name: "Daily Data Pack".into(),
            total_data_mb: 500.0,
            initial_used_mb: used,
            currency: "MB".into(),
        })
    }

    #[test]
    fn capture_copies_derived_values() {
        let snapshot = UsageSnapshot::capture(&engine(450.0));
        assert_eq!(snapshot.remaining_mb, 50.0);
        assert!((snapshot.percentage_remaining - 10.0).abs() < 1e-9);
        assert_eq!(snapshot.level, UsageLevel::Alert);
    }

    #[test]
    fn human_format_lists_amounts_and_status() {
        let out = format_snapshot(&UsageSnapshot::capture(&engine(125.0)), OutputFormat::Human);
        assert!(out.contains("=== Daily Data Pack ==="));
        assert!(out.contains("User:       Alex"));
        assert!(out.contains("500 MB"));
        assert!(out.contains("75% remaining (ok)"));
    }

    #[test]
    fn json_format_uses_camel_case_keys() {
        let out = format_snapshot(&UsageSnapshot::capture(&engine(0.0)), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["totalDataMB"], 500.0);
        assert_eq!(value["percentageRemaining"], 100.0);
        assert_eq!(value["level"], "nominal");
    }
}
