//! Usage-state engine: plan record, consumption, and everything derived from them.
//!
//! Pure in-memory state. The engine never schedules anything itself; the
//! effects layer calls [`UsageEngine::tick`] from its 1-second ticker and
//! [`UsageEngine::reset`] on recharge.
//!
//! Derived values are recomputed on every read:
//! - remaining = max(0, total - used)
//! - percentage = clamp(remaining / total * 100, 0, 100), or 0 when total is 0
//! - level: alert below 20%, warning below 50%, nominal otherwise

use std::ops::Range;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;

use crate::plan::PlanRecord;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Period of the consumption ticker.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Consumption added per tick, in MB (half-open).
pub const TICK_CONSUMPTION_MB: Range<f64> = 0.1..2.1;

/// Below this remaining percentage the plan is in the alert band.
pub const ALERT_BELOW_PCT: f64 = 20.0;

/// Below this remaining percentage (and at or above the alert bound) the plan
/// is in the warning band.
pub const WARNING_BELOW_PCT: f64 = 50.0;

// ============================================================================
// LEVEL
// ============================================================================

/// Display band for the remaining percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageLevel {
    /// Under 20% remaining.
    Alert,
    /// 20% up to (not including) 50% remaining.
    Warning,
    /// 50% or more remaining.
    Nominal,
}

impl UsageLevel {
    /// Classify a remaining percentage.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage < ALERT_BELOW_PCT {
            UsageLevel::Alert
        } else if percentage < WARNING_BELOW_PCT {
            UsageLevel::Warning
        } else {
            UsageLevel::Nominal
        }
    }
}

// ============================================================================
// PURE DERIVATIONS
// ============================================================================

/// Remaining allowance, never negative.
pub fn remaining_mb(total: f64, used: f64) -> f64 {
    (total - used).max(0.0)
}

/// Remaining allowance as a percentage of the total, in [0, 100].
pub fn remaining_percentage(total: f64, used: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    (remaining_mb(total, used) / total * 100.0).clamp(0.0, 100.0)
}

// ============================================================================
// ENGINE
// ============================================================================

/// Owns the plan record and the consumption counter.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageEngine {
    plan: PlanRecord,
    used_mb: f64,
}

impl UsageEngine {
    /// Start a session: consumption begins at the plan's initial-used amount.
    pub fn new(plan: PlanRecord) -> Self {
        let used_mb = plan.initial_used_mb.clamp(0.0, plan.total_data_mb.max(0.0));
        UsageEngine { plan, used_mb }
    }

    pub fn plan(&self) -> &PlanRecord {
        &self.plan
    }

    pub fn used_mb(&self) -> f64 {
        self.used_mb
    }

    pub fn remaining_mb(&self) -> f64 {
        remaining_mb(self.plan.total_data_mb, self.used_mb)
    }

    pub fn percentage(&self) -> f64 {
        remaining_percentage(self.plan.total_data_mb, self.used_mb)
    }

    pub fn level(&self) -> UsageLevel {
        UsageLevel::from_percentage(self.percentage())
    }

    /// True once consumption has reached the plan total.
    pub fn is_exhausted(&self) -> bool {
        self.used_mb >= self.plan.total_data_mb
    }

    /// Apply one timer tick.
    ///
    /// Adds a random amount from [`TICK_CONSUMPTION_MB`], clamped to the
    /// total. No-op once the allowance is used up. Returns true if
    /// consumption changed.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.is_exhausted() {
            return false;
        }
        let consumed = rng.random_range(TICK_CONSUMPTION_MB);
        self.used_mb = (self.used_mb + consumed).min(self.plan.total_data_mb);
        true
    }

    /// Recharge: consumption back to zero.
    pub fn reset(&mut self) {
        self.used_mb = 0.0;
    }

    /// Swap in a new plan record, keeping current consumption (clamped).
    ///
    /// Returns true if the plan total changed, which obliges the caller to
    /// restart the usage ticker.
    pub fn replace_plan(&mut self, plan: PlanRecord) -> bool {
        let total_changed = plan.total_data_mb != self.plan.total_data_mb;
        self.used_mb = self.used_mb.min(plan.total_data_mb.max(0.0));
        self.plan = plan;
        total_changed
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn plan(total: f64, initial_used: f64) -> PlanRecord {
        PlanRecord {
            user_id: "u1".into(),
            user_name: "Alex".into(),
            plan_name: "Daily Data Pack".into(),
            total_data_mb: total,
            initial_used_mb: initial_used,
            currency: "MB".into(),
        }
    }

    fn engine_with_used(total: f64, used: f64) -> UsageEngine {
        UsageEngine::new(plan(total, used))
    }

    // -- derivations --

    #[test]
    fn remaining_and_percentage_follow_consumption() {
        for used in [0.0, 1.5, 125.0, 250.0, 499.9, 500.0] {
            let engine = engine_with_used(500.0, used);
            let expected_remaining = 500.0 - used;
            assert!((engine.remaining_mb() - expected_remaining).abs() < 1e-9);
            let expected_pct = expected_remaining / 500.0 * 100.0;
            assert!((engine.percentage() - expected_pct).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_total_means_zero_percent() {
        assert_eq!(remaining_percentage(0.0, 0.0), 0.0);
        assert_eq!(remaining_percentage(0.0, 10.0), 0.0);
        assert_eq!(engine_with_used(0.0, 0.0).percentage(), 0.0);
    }

    #[test]
    fn remaining_never_negative() {
        assert_eq!(remaining_mb(100.0, 150.0), 0.0);
        assert_eq!(remaining_percentage(100.0, 150.0), 0.0);
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(UsageLevel::from_percentage(0.0), UsageLevel::Alert);
        assert_eq!(UsageLevel::from_percentage(19.9), UsageLevel::Alert);
        assert_eq!(UsageLevel::from_percentage(20.0), UsageLevel::Warning);
        assert_eq!(UsageLevel::from_percentage(49.9), UsageLevel::Warning);
        assert_eq!(UsageLevel::from_percentage(50.0), UsageLevel::Nominal);
        assert_eq!(UsageLevel::from_percentage(100.0), UsageLevel::Nominal);
    }

    #[test]
    fn heavy_usage_is_alert() {
        let engine = engine_with_used(500.0, 450.0);
        assert!((engine.percentage() - 10.0).abs() < 1e-9);
        assert_eq!(engine.level(), UsageLevel::Alert);
    }

    #[test]
    fn initial_used_beyond_total_is_clamped() {
        let engine = engine_with_used(100.0, 250.0);
        assert_eq!(engine.used_mb(), 100.0);
        assert!(engine.is_exhausted());
    }

    // -- reset --

    #[test]
    fn reset_restores_full_allowance() {
        let mut engine = engine_with_used(500.0, 0.0);
        engine.used_mb = 321.0;
        engine.reset();
        assert_eq!(engine.used_mb(), 0.0);
        assert_eq!(engine.remaining_mb(), 500.0);
        assert_eq!(engine.percentage(), 100.0);
        assert_eq!(engine.level(), UsageLevel::Nominal);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut once = engine_with_used(500.0, 80.0);
        once.reset();
        let mut twice = engine_with_used(500.0, 80.0);
        twice.reset();
        twice.reset();
        assert_eq!(once, twice);
    }

    // -- ticks --

    #[test]
    fn tick_adds_bounded_amount() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut engine = engine_with_used(500.0, 0.0);
        for _ in 0..50 {
            let before = engine.used_mb();
            assert!(engine.tick(&mut rng));
            let delta = engine.used_mb() - before;
            assert!(delta > 0.1 - 1e-9 && delta < 2.1 + 1e-9, "delta {} out of range", delta);
        }
    }

    #[test]
    fn ticks_are_monotonic_and_saturate() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut engine = engine_with_used(20.0, 0.0);
        let mut previous = engine.used_mb();
        for _ in 0..200 {
            engine.tick(&mut rng);
            assert!(engine.used_mb() >= previous);
            assert!(engine.used_mb() <= 20.0);
            previous = engine.used_mb();
        }
        assert_eq!(engine.used_mb(), 20.0);
        assert!(!engine.tick(&mut rng));
        assert_eq!(engine.used_mb(), 20.0);
        assert_eq!(engine.percentage(), 0.0);
    }

    // -- plan replacement --

    #[test]
    fn replace_plan_reports_total_change() {
        let mut engine = engine_with_used(500.0, 120.0);
        assert!(!engine.replace_plan(plan(500.0, 0.0)));
        assert_eq!(engine.used_mb(), 120.0);

        assert!(engine.replace_plan(plan(100.0, 0.0)));
        assert_eq!(engine.used_mb(), 100.0);
        assert_eq!(engine.plan().total_data_mb, 100.0);
    }
}
