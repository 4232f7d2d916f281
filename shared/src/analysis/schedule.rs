//! Stage duration model
//!
//! Derives the expected per-stage time window for a detail from its harvest
//! window and the stages observed so far. The window shrinks monotonically as
//! more distinct stages get logged, and is never shorter than one day.

use chrono::NaiveDate;

use super::policy::DeviationPolicy;

/// Expected stage count and per-stage window for one detail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSchedule {
    pub expected_stage_count: i64,
    pub stage_duration_days: i64,
}

impl StageSchedule {
    /// Derive the schedule from the detail's harvest window and the number of
    /// distinct stages observed in its progress history.
    ///
    /// The expected stage count is the larger of the observed count and the
    /// canonical farming stage count, so early-stage details are not scored
    /// against a one- or two-stage plan. When either boundary date is
    /// missing (or the window is empty) the per-stage duration falls back to
    /// the policy default.
    pub fn derive(
        harvest_start: Option<NaiveDate>,
        harvest_end: Option<NaiveDate>,
        observed_stage_count: usize,
        policy: &DeviationPolicy,
    ) -> Self {
        let expected_stage_count =
            (observed_stage_count as i64).max(policy.canonical_stage_count);

        let stage_duration_days = match (harvest_start, harvest_end) {
            (Some(start), Some(end)) => {
                let total_days = (end - start).num_days();
                if total_days > 0 {
                    (total_days / expected_stage_count).max(1)
                } else {
                    policy.default_stage_duration_days
                }
            }
            _ => policy.default_stage_duration_days,
        };

        Self {
            expected_stage_count,
            stage_duration_days,
        }
    }
}
