//! Classification policy for deviation analysis
//!
//! All cutoffs live here as named values so they can be tuned through
//! configuration without touching the aggregation logic. Two independent
//! severity axes are kept deliberately separate: the percentage-magnitude
//! axis answers "how far off is the schedule as a whole", the day-magnitude
//! axis answers "how far off is an individual stage". They meet only in the
//! status decision.

use rust_decimal::Decimal;

use crate::models::{DeviationLevel, DeviationStatus};

/// Threshold set applied by every analyzer level
#[derive(Debug, Clone, PartialEq)]
pub struct DeviationPolicy {
    /// Deviation percent beyond which a result is Ahead/Behind (strict)
    pub on_time_band_percent: Decimal,
    /// Upper bound (inclusive) of the Low percentage-level bucket
    pub level_low_percent: Decimal,
    /// Upper bound (inclusive) of the Medium percentage-level bucket
    pub level_medium_percent: Decimal,
    /// Upper bound (inclusive) of the High percentage-level bucket
    pub level_high_percent: Decimal,
    /// Days behind beyond which status is Critical (strict)
    pub critical_days_behind: i64,
    /// Upper bound (inclusive) of the Low per-stage day bucket
    pub stage_level_low_days: i64,
    /// Upper bound (inclusive) of the Medium per-stage day bucket
    pub stage_level_medium_days: i64,
    /// Upper bound (inclusive) of the High per-stage day bucket
    pub stage_level_high_days: i64,
    /// Per-stage window when a detail has no usable harvest window
    pub default_stage_duration_days: i64,
    /// Canonical number of farming stages; floors the inferred stage count
    pub canonical_stage_count: i64,
    /// Yield deviation percent below which the yield recommendation fires
    pub yield_alert_percent: Decimal,
    /// Bound on the worst-deviations list in overall reports
    pub top_deviation_limit: usize,
}

impl Default for DeviationPolicy {
    fn default() -> Self {
        Self {
            on_time_band_percent: Decimal::from(10),
            level_low_percent: Decimal::from(10),
            level_medium_percent: Decimal::from(25),
            level_high_percent: Decimal::from(50),
            critical_days_behind: 30,
            stage_level_low_days: 3,
            stage_level_medium_days: 7,
            stage_level_high_days: 14,
            default_stage_duration_days: 30,
            canonical_stage_count: 5,
            yield_alert_percent: Decimal::from(-10),
            top_deviation_limit: 10,
        }
    }
}

impl DeviationPolicy {
    /// Status decision combining the day-based and percentage-based signals.
    ///
    /// Days behind beyond the critical cutoff override the percentage signal
    /// entirely; inside the on-time band (inclusive) the result is OnTime.
    pub fn classify_status(&self, deviation_percent: Decimal, days_behind: i64) -> DeviationStatus {
        if days_behind > self.critical_days_behind {
            DeviationStatus::Critical
        } else if deviation_percent < -self.on_time_band_percent {
            DeviationStatus::Behind
        } else if deviation_percent > self.on_time_band_percent {
            DeviationStatus::Ahead
        } else {
            DeviationStatus::OnTime
        }
    }

    /// Percentage-magnitude severity, applied to |deviation percent|
    pub fn classify_level(&self, deviation_magnitude: Decimal) -> DeviationLevel {
        if deviation_magnitude <= self.level_low_percent {
            DeviationLevel::Low
        } else if deviation_magnitude <= self.level_medium_percent {
            DeviationLevel::Medium
        } else if deviation_magnitude <= self.level_high_percent {
            DeviationLevel::High
        } else {
            DeviationLevel::Critical
        }
    }

    /// Day-magnitude severity for a single stage, applied to
    /// max(days ahead, days behind)
    pub fn classify_stage_level(&self, offset_days: i64) -> DeviationLevel {
        if offset_days <= self.stage_level_low_days {
            DeviationLevel::Low
        } else if offset_days <= self.stage_level_medium_days {
            DeviationLevel::Medium
        } else if offset_days <= self.stage_level_high_days {
            DeviationLevel::High
        } else {
            DeviationLevel::Critical
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> DeviationPolicy {
        DeviationPolicy::default()
    }

    #[test]
    fn status_on_time_band_is_inclusive() {
        // Exactly +10 / -10 stay OnTime; the comparisons are strict
        assert_eq!(
            policy().classify_status(Decimal::from(10), 0),
            DeviationStatus::OnTime
        );
        assert_eq!(
            policy().classify_status(Decimal::from(-10), 0),
            DeviationStatus::OnTime
        );
        assert_eq!(
            policy().classify_status(Decimal::new(101, 1), 0),
            DeviationStatus::Ahead
        );
        assert_eq!(
            policy().classify_status(Decimal::new(-101, 1), 0),
            DeviationStatus::Behind
        );
    }

    #[test]
    fn status_days_behind_overrides_percentage() {
        // A strongly positive percentage cannot mask a 31-day lag
        assert_eq!(
            policy().classify_status(Decimal::from(40), 31),
            DeviationStatus::Critical
        );
        // Exactly 30 days is not yet critical
        assert_eq!(
            policy().classify_status(Decimal::ZERO, 30),
            DeviationStatus::OnTime
        );
    }

    #[test]
    fn percent_level_buckets() {
        assert_eq!(policy().classify_level(Decimal::from(10)), DeviationLevel::Low);
        assert_eq!(policy().classify_level(Decimal::from(11)), DeviationLevel::Medium);
        assert_eq!(policy().classify_level(Decimal::from(25)), DeviationLevel::Medium);
        assert_eq!(policy().classify_level(Decimal::from(26)), DeviationLevel::High);
        assert_eq!(policy().classify_level(Decimal::from(50)), DeviationLevel::High);
        assert_eq!(policy().classify_level(Decimal::from(51)), DeviationLevel::Critical);
    }

    #[test]
    fn stage_level_buckets() {
        assert_eq!(policy().classify_stage_level(0), DeviationLevel::Low);
        assert_eq!(policy().classify_stage_level(3), DeviationLevel::Low);
        assert_eq!(policy().classify_stage_level(4), DeviationLevel::Medium);
        assert_eq!(policy().classify_stage_level(7), DeviationLevel::Medium);
        assert_eq!(policy().classify_stage_level(8), DeviationLevel::High);
        assert_eq!(policy().classify_stage_level(14), DeviationLevel::High);
        assert_eq!(policy().classify_stage_level(15), DeviationLevel::Critical);
    }
}
