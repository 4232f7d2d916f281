//! Per-stage deviation analysis
//!
//! Compares each recorded progress entry against its expected slot in the
//! detail's schedule and classifies the signed day offset.

use chrono::{Duration, NaiveDate};

use super::policy::DeviationPolicy;
use super::schedule::StageSchedule;
use crate::models::{CropProgress, DeviationStatus, StageDeviation};

/// Analyze every progress entry of a detail against its stage schedule.
///
/// Entries keep their input order. The order index used for slotting is the
/// entry's 1-based step index, falling back to its iteration position when
/// absent. Entries without a recorded date, and all entries when the detail
/// has no harvest-start anchor, are not yet assessable and come back as
/// OnTime/Low with zero offsets.
pub fn analyze_stage_progress(
    progress: &[CropProgress],
    schedule: &StageSchedule,
    anchor: Option<NaiveDate>,
    policy: &DeviationPolicy,
) -> Vec<StageDeviation> {
    progress
        .iter()
        .enumerate()
        .map(|(position, entry)| {
            let order_index = entry.step_index.unwrap_or(position as i32 + 1);
            analyze_entry(entry, order_index, schedule, anchor, policy)
        })
        .collect()
}

fn analyze_entry(
    entry: &CropProgress,
    order_index: i32,
    schedule: &StageSchedule,
    anchor: Option<NaiveDate>,
    policy: &DeviationPolicy,
) -> StageDeviation {
    let expected_start = anchor
        .map(|start| start + Duration::days((order_index as i64 - 1) * schedule.stage_duration_days));
    let expected_end = expected_start.map(|start| start + Duration::days(schedule.stage_duration_days));

    let mut deviation = StageDeviation {
        stage_id: entry.stage_id,
        stage_name: entry.stage_name.clone(),
        order_index,
        expected_start,
        expected_end,
        actual_date: entry.progress_date,
        days_ahead: 0,
        days_behind: 0,
        status: DeviationStatus::OnTime,
        level: policy.classify_stage_level(0),
    };

    let (Some(expected_start), Some(actual)) = (expected_start, entry.progress_date) else {
        // No date recorded yet, or no anchor to schedule against
        return deviation;
    };

    let offset_days = (actual - expected_start).num_days();
    if offset_days < 0 {
        deviation.days_ahead = -offset_days;
        deviation.status = DeviationStatus::Ahead;
    } else if offset_days > 0 {
        deviation.days_behind = offset_days;
        deviation.status = if offset_days > policy.critical_days_behind {
            DeviationStatus::Critical
        } else {
            DeviationStatus::Behind
        };
    }
    deviation.level = policy.classify_stage_level(deviation.days_ahead.max(deviation.days_behind));
    deviation
}
