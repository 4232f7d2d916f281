//! Tests for the progress deviation analysis engine
//!
//! Covers the stage duration model, the per-stage analyzer, and the
//! detail-level analyzer, including the documented boundary cases.

use chrono::{Duration, NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::{
    analyze_detail, analyze_stage_progress, expected_progress_percent, yield_deviation_percent,
    CropProgress, CropSeasonDetail, DeviationLevel, DeviationPolicy, DeviationStatus,
    RecommendationCategory, StageSchedule,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn progress_entry(step_index: i32, progress_date: Option<NaiveDate>) -> CropProgress {
    CropProgress {
        id: Uuid::new_v4(),
        crop_season_detail_id: Uuid::new_v4(),
        stage_id: Uuid::new_v4(),
        stage_code: format!("stage-{}", step_index),
        stage_name: format!("Stage {}", step_index),
        step_index: Some(step_index),
        progress_date,
        notes: None,
        created_at: Utc::now(),
    }
}

fn detail(
    harvest_start: Option<NaiveDate>,
    harvest_end: Option<NaiveDate>,
    progress: Vec<CropProgress>,
) -> CropSeasonDetail {
    CropSeasonDetail {
        id: Uuid::new_v4(),
        code: "CS-2023-0001-01".to_string(),
        crop_season_id: Uuid::new_v4(),
        area_rai: Some(dec("12.5")),
        expected_harvest_start: harvest_start,
        expected_harvest_end: harvest_end,
        expected_yield_kg: None,
        actual_yield_kg: None,
        is_deleted: false,
        progress,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// A 120-day harvest window with entries logged exactly on their slots
/// (5 expected stages, 24 days per stage)
fn on_schedule_detail(entries: usize) -> CropSeasonDetail {
    let start = date(2023, 1, 1);
    let progress = (1..=entries as i32)
        .map(|i| {
            progress_entry(
                i,
                Some(start + Duration::days((i as i64 - 1) * 24)),
            )
        })
        .collect();
    detail(Some(start), Some(date(2023, 5, 1)), progress)
}

// =============================================================================
// Stage Duration Model
// =============================================================================

mod stage_schedule {
    use super::*;

    #[test]
    fn divides_window_by_floored_stage_count() {
        let policy = DeviationPolicy::default();
        let schedule = StageSchedule::derive(
            Some(date(2023, 1, 1)),
            Some(date(2023, 5, 1)),
            3,
            &policy,
        );
        // 3 observed stages floor to the canonical 5
        assert_eq!(schedule.expected_stage_count, 5);
        assert_eq!(schedule.stage_duration_days, 24);
    }

    #[test]
    fn missing_dates_fall_back_to_default() {
        let policy = DeviationPolicy::default();
        let schedule = StageSchedule::derive(None, None, 0, &policy);
        assert_eq!(schedule.stage_duration_days, 30);
        assert_eq!(schedule.expected_stage_count, 5);
    }

    #[test]
    fn more_observed_stages_never_lengthen_the_window() {
        let policy = DeviationPolicy::default();
        let mut last = i64::MAX;
        for observed in 0..12 {
            let schedule = StageSchedule::derive(
                Some(date(2023, 1, 1)),
                Some(date(2023, 5, 1)),
                observed,
                &policy,
            );
            assert!(schedule.stage_duration_days <= last);
            last = schedule.stage_duration_days;
        }
    }
}

// =============================================================================
// Stage Deviation Analyzer
// =============================================================================

mod stage_analyzer {
    use super::*;

    fn schedule() -> StageSchedule {
        StageSchedule {
            expected_stage_count: 5,
            stage_duration_days: 24,
        }
    }

    #[test]
    fn signed_offset_splits_into_ahead_xor_behind() {
        let policy = DeviationPolicy::default();
        let anchor = Some(date(2023, 1, 1));
        let entries = vec![
            progress_entry(1, Some(date(2022, 12, 27))), // 5 days early
            progress_entry(2, Some(date(2023, 1, 25))),  // exactly on slot
            progress_entry(3, Some(date(2023, 2, 28))),  // 10 days late
        ];
        let result = analyze_stage_progress(&entries, &schedule(), anchor, &policy);

        assert_eq!(result[0].status, DeviationStatus::Ahead);
        assert_eq!((result[0].days_ahead, result[0].days_behind), (5, 0));

        assert_eq!(result[1].status, DeviationStatus::OnTime);
        assert_eq!((result[1].days_ahead, result[1].days_behind), (0, 0));

        assert_eq!(result[2].status, DeviationStatus::Behind);
        assert_eq!((result[2].days_ahead, result[2].days_behind), (0, 10));
        assert_eq!(result[2].level, DeviationLevel::High);
    }

    #[test]
    fn day_level_boundaries() {
        let policy = DeviationPolicy::default();
        let anchor = Some(date(2023, 1, 1));
        // Offsets of 3, 7, 14, 15 days against the first slot
        let cases = [
            (3, DeviationLevel::Low),
            (7, DeviationLevel::Medium),
            (14, DeviationLevel::High),
            (15, DeviationLevel::Critical),
        ];
        for (offset, expected_level) in cases {
            let entries = vec![progress_entry(1, Some(date(2023, 1, 1) + Duration::days(offset)))];
            let result = analyze_stage_progress(&entries, &schedule(), anchor, &policy);
            assert_eq!(result[0].level, expected_level, "offset {}", offset);
        }
    }

    #[test]
    fn thirty_one_days_late_is_critical_status() {
        let policy = DeviationPolicy::default();
        let anchor = Some(date(2023, 1, 1));
        let thirty = vec![progress_entry(1, Some(date(2023, 1, 31)))];
        let thirty_one = vec![progress_entry(1, Some(date(2023, 2, 1)))];

        let result = analyze_stage_progress(&thirty, &schedule(), anchor, &policy);
        assert_eq!(result[0].status, DeviationStatus::Behind);

        let result = analyze_stage_progress(&thirty_one, &schedule(), anchor, &policy);
        assert_eq!(result[0].status, DeviationStatus::Critical);
    }

    #[test]
    fn output_preserves_input_order() {
        let policy = DeviationPolicy::default();
        let anchor = Some(date(2023, 1, 1));
        let entries = vec![
            progress_entry(3, Some(date(2023, 2, 18))),
            progress_entry(1, Some(date(2023, 1, 1))),
        ];
        let result = analyze_stage_progress(&entries, &schedule(), anchor, &policy);
        assert_eq!(result[0].order_index, 3);
        assert_eq!(result[1].order_index, 1);
    }
}

// =============================================================================
// Detail Deviation Analyzer
// =============================================================================

mod detail_analyzer {
    use super::*;

    /// 120-day window, 3 entries on schedule, evaluated 60 days in:
    /// expected 50 %, actual 60 %, deviation exactly +10 stays OnTime
    #[test]
    fn on_time_band_boundary_is_inclusive() {
        let policy = DeviationPolicy::default();
        let analysis = analyze_detail(&on_schedule_detail(3), &policy, date(2023, 3, 2));

        assert_eq!(analysis.expected_progress_percent, Decimal::from(50));
        assert_eq!(analysis.actual_progress_percent, Decimal::from(60));
        assert_eq!(analysis.deviation_percent, Decimal::from(10));
        assert_eq!(analysis.days_behind, 0);
        assert_eq!(analysis.status, DeviationStatus::OnTime);
        assert_eq!(analysis.level, DeviationLevel::Low);
        assert_eq!(analysis.expected_stage_count, 5);
        assert_eq!(analysis.completed_stage_count, 3);
        assert_eq!(analysis.current_stage_index, 3);
    }

    #[test]
    fn past_the_band_classifies_ahead() {
        let policy = DeviationPolicy::default();
        // 4 entries → 80 % actual vs 50 % expected
        let analysis = analyze_detail(&on_schedule_detail(4), &policy, date(2023, 3, 2));
        assert_eq!(analysis.deviation_percent, Decimal::from(30));
        assert_eq!(analysis.status, DeviationStatus::Ahead);
        assert_eq!(analysis.level, DeviationLevel::High);
    }

    /// A 40-day-late stage drives the whole detail Critical even though the
    /// percentage deviation is still +10
    #[test]
    fn late_stage_overrides_percentage_signal() {
        let policy = DeviationPolicy::default();
        let mut detail = on_schedule_detail(3);
        // Third slot is 2023-02-18; log it 40 days later
        detail.progress[2].progress_date = Some(date(2023, 2, 18) + Duration::days(40));

        let analysis = analyze_detail(&detail, &policy, date(2023, 3, 2));
        assert_eq!(analysis.deviation_percent, Decimal::from(10));
        assert_eq!(analysis.days_behind, 40);
        assert_eq!(analysis.status, DeviationStatus::Critical);

        let third = &analysis.stage_deviations[2];
        assert_eq!(third.days_behind, 40);
        assert_eq!(third.level, DeviationLevel::Critical);
    }

    #[test]
    fn percentage_gap_converts_to_estimated_days() {
        let policy = DeviationPolicy::default();
        // No progress at all, 60 days into a 120-day window: expected 50 %,
        // actual 0 %, gap 50 % of 120 days = 60 days behind
        let analysis = analyze_detail(
            &detail(Some(date(2023, 1, 1)), Some(date(2023, 5, 1)), vec![]),
            &policy,
            date(2023, 3, 2),
        );
        assert_eq!(analysis.actual_progress_percent, Decimal::ZERO);
        assert_eq!(analysis.days_behind, 60);
        assert_eq!(analysis.status, DeviationStatus::Critical);
        assert_eq!(analysis.level, DeviationLevel::High);
    }

    #[test]
    fn yield_shortfall_is_relative() {
        let policy = DeviationPolicy::default();
        let mut d = on_schedule_detail(3);
        d.expected_yield_kg = Some(Decimal::from(1000));
        d.actual_yield_kg = Some(Decimal::from(850));

        let analysis = analyze_detail(&d, &policy, date(2023, 3, 2));
        assert_eq!(analysis.yield_deviation_percent, Some(Decimal::from(-15)));
        assert!(analysis
            .recommendations
            .iter()
            .any(|r| r.category == RecommendationCategory::Yield));
    }

    #[test]
    fn missing_expected_yield_stays_unset() {
        let policy = DeviationPolicy::default();
        let mut d = on_schedule_detail(3);
        d.expected_yield_kg = None;
        d.actual_yield_kg = Some(Decimal::from(1));

        let analysis = analyze_detail(&d, &policy, date(2023, 3, 2));
        assert_eq!(analysis.yield_deviation_percent, None);
        assert!(analysis
            .recommendations
            .iter()
            .all(|r| r.category != RecommendationCategory::Yield));
    }

    #[test]
    fn no_dates_means_no_expected_progress() {
        let policy = DeviationPolicy::default();
        let analysis = analyze_detail(
            &detail(None, None, vec![progress_entry(1, Some(date(2023, 2, 1)))]),
            &policy,
            date(2023, 3, 2),
        );
        assert_eq!(analysis.expected_progress_percent, Decimal::ZERO);
        assert_eq!(analysis.days_behind, 0);
        // 1 of 5 canonical stages
        assert_eq!(analysis.actual_progress_percent, Decimal::from(20));
        assert_eq!(analysis.status, DeviationStatus::Ahead);
    }
}

// =============================================================================
// Property-Based Tests
// =============================================================================

fn optional_date_strategy() -> impl Strategy<Value = Option<NaiveDate>> {
    proptest::option::of((0i64..=3000).prop_map(|offset| date(2020, 1, 1) + Duration::days(offset)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Expected progress is always inside [0, 100] and actual progress is
    /// never negative, whatever the window and history look like
    #[test]
    fn prop_progress_percent_bounds(
        start in optional_date_strategy(),
        end in optional_date_strategy(),
        as_of_offset in 0i64..=3000,
        entries in 0usize..=12,
    ) {
        let policy = DeviationPolicy::default();
        let as_of = date(2020, 1, 1) + Duration::days(as_of_offset);
        let progress = (1..=entries as i32)
            .map(|i| progress_entry(i, Some(as_of - Duration::days(i as i64))))
            .collect();
        let analysis = analyze_detail(&detail(start, end, progress), &policy, as_of);

        prop_assert!(analysis.actual_progress_percent >= Decimal::ZERO);
        prop_assert!(analysis.expected_progress_percent >= Decimal::ZERO);
        prop_assert!(analysis.expected_progress_percent <= Decimal::from(100));
        prop_assert!(analysis.days_behind >= 0);
    }

    /// More than the critical day cutoff behind always classifies Critical,
    /// regardless of the percentage deviation
    #[test]
    fn prop_days_behind_overrides_percentage(
        deviation_percent in -200i64..=200,
        days_behind in 31i64..=365,
    ) {
        let policy = DeviationPolicy::default();
        let status = policy.classify_status(Decimal::from(deviation_percent), days_behind);
        prop_assert_eq!(status, DeviationStatus::Critical);
    }

    /// Zero or missing expected yield never produces a yield deviation
    #[test]
    fn prop_no_division_by_zero_yield(actual in proptest::option::of(0i64..=100_000)) {
        let actual = actual.map(Decimal::from);
        prop_assert_eq!(yield_deviation_percent(None, actual), None);
        prop_assert_eq!(yield_deviation_percent(Some(Decimal::ZERO), actual), None);
    }

    /// Derived stage duration is always at least one day
    #[test]
    fn prop_stage_duration_at_least_one_day(
        start in optional_date_strategy(),
        end in optional_date_strategy(),
        observed in 0usize..=40,
    ) {
        let policy = DeviationPolicy::default();
        let schedule = StageSchedule::derive(start, end, observed, &policy);
        prop_assert!(schedule.stage_duration_days >= 1);
        prop_assert!(schedule.expected_stage_count >= policy.canonical_stage_count);
    }

    /// The time-based expectation is monotone in the evaluation date
    #[test]
    fn prop_expected_progress_monotone(
        window_days in 1i64..=500,
        a in 0i64..=600,
        b in 0i64..=600,
    ) {
        let start = date(2023, 1, 1);
        let end = start + Duration::days(window_days);
        let (early, late) = if a <= b { (a, b) } else { (b, a) };
        let at_early =
            expected_progress_percent(Some(start), Some(end), start + Duration::days(early));
        let at_late =
            expected_progress_percent(Some(start), Some(end), start + Duration::days(late));
        prop_assert!(at_early <= at_late);
    }
}
