//! Detail-level deviation analysis
//!
//! Folds a single cultivated area's stage deviations into one
//! percentage-based and day-based summary, plus yield deviation.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::policy::DeviationPolicy;
use super::recommend::{generate_recommendations, RecommendationContext};
use super::schedule::StageSchedule;
use super::stage::analyze_stage_progress;
use crate::models::{AnalysisScope, CropSeasonDetail, ProgressDeviationAnalysis};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Analyze one detail against its full progress history as of a given date
pub fn analyze_detail(
    detail: &CropSeasonDetail,
    policy: &DeviationPolicy,
    as_of: NaiveDate,
) -> ProgressDeviationAnalysis {
    let distinct_stages: HashSet<_> = detail.progress.iter().map(|p| p.stage_id).collect();
    let schedule = StageSchedule::derive(
        detail.expected_harvest_start,
        detail.expected_harvest_end,
        distinct_stages.len(),
        policy,
    );

    let completed_stage_count = detail.progress.len() as i64;
    let current_stage_index = detail
        .progress
        .iter()
        .filter_map(|p| p.step_index)
        .max()
        .unwrap_or(0);

    let actual_progress_percent = if schedule.expected_stage_count == 0 {
        Decimal::ZERO
    } else {
        Decimal::from(completed_stage_count) * HUNDRED / Decimal::from(schedule.expected_stage_count)
    };
    let expected_progress_percent = expected_progress_percent(
        detail.expected_harvest_start,
        detail.expected_harvest_end,
        as_of,
    );

    let stage_deviations = analyze_stage_progress(
        &detail.progress,
        &schedule,
        detail.expected_harvest_start,
        policy,
    );

    let worst_stage_lag = stage_deviations
        .iter()
        .map(|s| s.days_behind)
        .max()
        .unwrap_or(0);
    let estimated_lag = estimate_days_behind(
        expected_progress_percent,
        actual_progress_percent,
        detail.expected_harvest_start,
        detail.expected_harvest_end,
    );
    let days_behind = worst_stage_lag.max(estimated_lag);

    let deviation_percent = actual_progress_percent - expected_progress_percent;
    let status = policy.classify_status(deviation_percent, days_behind);
    let level = policy.classify_level(deviation_percent.abs());

    let yield_deviation_percent =
        yield_deviation_percent(detail.expected_yield_kg, detail.actual_yield_kg);

    let recommendations = generate_recommendations(
        &RecommendationContext {
            status,
            level,
            yield_deviation_percent,
        },
        policy,
    );

    ProgressDeviationAnalysis {
        id: detail.id,
        code: detail.code.clone(),
        scope: AnalysisScope::Detail,
        expected_progress_percent,
        actual_progress_percent,
        expected_stage_count: schedule.expected_stage_count,
        completed_stage_count,
        current_stage_index,
        deviation_percent,
        days_behind,
        status,
        level,
        yield_deviation_percent,
        stage_deviations,
        recommendations,
    }
}

/// Linear time-based progress expectation, clamped to [0, 100].
///
/// Returns zero when either boundary date is absent or the window is empty.
pub fn expected_progress_percent(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    as_of: NaiveDate,
) -> Decimal {
    let (Some(start), Some(end)) = (start, end) else {
        return Decimal::ZERO;
    };
    let total_days = (end - start).num_days();
    if total_days <= 0 {
        return Decimal::ZERO;
    }
    let elapsed = (as_of - start).num_days().clamp(0, total_days);
    Decimal::from(elapsed) * HUNDRED / Decimal::from(total_days)
}

/// Convert a non-negative expected-vs-actual percentage gap into days.
///
/// Requires both boundary dates; the gap share of the total window is rounded
/// to whole days and floored at zero.
pub fn estimate_days_behind(
    expected_percent: Decimal,
    actual_percent: Decimal,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> i64 {
    let (Some(start), Some(end)) = (start, end) else {
        return 0;
    };
    let total_days = (end - start).num_days();
    if total_days <= 0 {
        return 0;
    }
    let gap = expected_percent - actual_percent;
    if gap <= Decimal::ZERO {
        return 0;
    }
    (gap * Decimal::from(total_days) / HUNDRED)
        .round()
        .to_i64()
        .unwrap_or(0)
        .max(0)
}

/// Relative yield shortfall/overshoot; unset unless both yields are known and
/// the expectation is non-zero
pub fn yield_deviation_percent(
    expected_yield: Option<Decimal>,
    actual_yield: Option<Decimal>,
) -> Option<Decimal> {
    match (expected_yield, actual_yield) {
        (Some(expected), Some(actual)) if !expected.is_zero() => {
            Some((actual - expected) * HUNDRED / expected)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn expected_progress_is_linear_and_clamped() {
        let start = Some(date(2023, 1, 1));
        let end = Some(date(2023, 5, 1)); // 120 days

        assert_eq!(
            expected_progress_percent(start, end, date(2022, 12, 1)),
            Decimal::ZERO
        );
        assert_eq!(
            expected_progress_percent(start, end, date(2023, 3, 2)),
            Decimal::from(50)
        );
        assert_eq!(
            expected_progress_percent(start, end, date(2023, 6, 1)),
            Decimal::from(100)
        );
    }

    #[test]
    fn expected_progress_needs_both_dates() {
        assert_eq!(
            expected_progress_percent(Some(date(2023, 1, 1)), None, date(2023, 2, 1)),
            Decimal::ZERO
        );
        assert_eq!(
            expected_progress_percent(None, Some(date(2023, 5, 1)), date(2023, 2, 1)),
            Decimal::ZERO
        );
    }

    #[test]
    fn gap_estimate_rounds_to_days() {
        let start = Some(date(2023, 1, 1));
        let end = Some(date(2023, 5, 1)); // 120 days
        // 25% of 120 days
        assert_eq!(
            estimate_days_behind(Decimal::from(75), Decimal::from(50), start, end),
            30
        );
        // Negative gap (ahead of schedule) floors at zero
        assert_eq!(
            estimate_days_behind(Decimal::from(40), Decimal::from(60), start, end),
            0
        );
        // No window, no estimate
        assert_eq!(
            estimate_days_behind(Decimal::from(75), Decimal::from(50), start, None),
            0
        );
    }

    #[test]
    fn yield_deviation_guards_division() {
        assert_eq!(
            yield_deviation_percent(Some(Decimal::from(1000)), Some(Decimal::from(850))),
            Some(Decimal::from(-15))
        );
        assert_eq!(yield_deviation_percent(None, Some(Decimal::from(850))), None);
        assert_eq!(yield_deviation_percent(Some(Decimal::from(1000)), None), None);
        assert_eq!(
            yield_deviation_percent(Some(Decimal::ZERO), Some(Decimal::from(850))),
            None
        );
    }
}
