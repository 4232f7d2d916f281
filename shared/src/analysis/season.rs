//! Season-level deviation analysis
//!
//! Aggregates every live detail's analysis into one season summary.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::detail::{analyze_detail, estimate_days_behind, expected_progress_percent};
use super::policy::DeviationPolicy;
use super::recommend::{generate_recommendations, RecommendationContext};
use crate::models::{AnalysisScope, CropSeason, ProgressDeviationAnalysis};

/// Analyze a season by folding the analyses of its non-deleted details
pub fn analyze_season(
    season: &CropSeason,
    policy: &DeviationPolicy,
    as_of: NaiveDate,
) -> ProgressDeviationAnalysis {
    let detail_analyses: Vec<ProgressDeviationAnalysis> = season
        .live_details()
        .map(|detail| analyze_detail(detail, policy, as_of))
        .collect();

    let expected_stage_count = detail_analyses
        .iter()
        .map(|a| a.expected_stage_count)
        .max()
        .unwrap_or(0)
        .max(1);
    let completed_stage_count: i64 = detail_analyses.iter().map(|a| a.completed_stage_count).sum();
    let current_stage_index = detail_analyses
        .iter()
        .map(|a| a.current_stage_index)
        .max()
        .unwrap_or(0);

    let actual_progress_percent = mean(
        detail_analyses
            .iter()
            .map(|a| a.actual_progress_percent),
    );
    let expected_progress_percent =
        expected_progress_percent(season.start_date, season.end_date, as_of);
    let deviation_percent = actual_progress_percent - expected_progress_percent;

    let worst_detail_lag = detail_analyses
        .iter()
        .map(|a| a.days_behind)
        .max()
        .unwrap_or(0);
    let estimated_lag = estimate_days_behind(
        expected_progress_percent,
        actual_progress_percent,
        season.start_date,
        season.end_date,
    );
    let days_behind = worst_detail_lag.max(estimated_lag);

    let status = policy.classify_status(deviation_percent, days_behind);
    let level = policy.classify_level(deviation_percent.abs());

    // Season-level yield signal: only meaningful when every harvested detail
    // reported, so the worst detail shortfall is carried up
    let yield_deviation_percent = detail_analyses
        .iter()
        .filter_map(|a| a.yield_deviation_percent)
        .min();

    // Input order preserved, not re-sorted
    let stage_deviations = detail_analyses
        .iter()
        .flat_map(|a| a.stage_deviations.iter().cloned())
        .collect();

    let recommendations = generate_recommendations(
        &RecommendationContext {
            status,
            level,
            yield_deviation_percent,
        },
        policy,
    );

    ProgressDeviationAnalysis {
        id: season.id,
        code: season.code.clone(),
        scope: AnalysisScope::Season,
        expected_progress_percent,
        actual_progress_percent,
        expected_stage_count,
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

fn mean(values: impl Iterator<Item = Decimal>) -> Decimal {
    let (sum, count) = values.fold((Decimal::ZERO, 0i64), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        Decimal::ZERO
    } else {
        sum / Decimal::from(count)
    }
}
