//! Portfolio reporting
//!
//! Folds many season analyses into one statistical report with rankings.

use rust_decimal::Decimal;

use super::policy::DeviationPolicy;
use crate::models::{DeviationStatus, OverallDeviationReport, ProgressDeviationAnalysis};
use crate::types::DateRange;

/// Build an overall report from season analyses within a reporting window
pub fn build_overall_report(
    analyses: Vec<ProgressDeviationAnalysis>,
    window: DateRange,
    policy: &DeviationPolicy,
) -> OverallDeviationReport {
    let total = analyses.len() as i64;
    let count_status = |status: DeviationStatus| -> i64 {
        analyses.iter().filter(|a| a.status == status).count() as i64
    };

    let average_deviation_percent = mean_of(&analyses, |a| a.deviation_magnitude());
    // Analyses without harvest data average as zero, which dilutes the
    // yield signal for seasons still in the field
    let average_yield_deviation_percent = mean_of(&analyses, |a| {
        a.yield_deviation_percent.map(|y| y.abs()).unwrap_or(Decimal::ZERO)
    });

    let critical_analyses: Vec<ProgressDeviationAnalysis> = analyses
        .iter()
        .filter(|a| a.status == DeviationStatus::Critical)
        .cloned()
        .collect();

    let on_time_seasons = count_status(DeviationStatus::OnTime);
    let ahead_seasons = count_status(DeviationStatus::Ahead);
    let behind_seasons = count_status(DeviationStatus::Behind);
    let critical_seasons = count_status(DeviationStatus::Critical);

    let mut top_deviations = analyses;
    top_deviations.sort_by(|a, b| b.deviation_magnitude().cmp(&a.deviation_magnitude()));
    top_deviations.truncate(policy.top_deviation_limit);

    OverallDeviationReport {
        from_date: window.start,
        to_date: window.end,
        total_crop_seasons: total,
        on_time_seasons,
        ahead_seasons,
        behind_seasons,
        critical_seasons,
        average_deviation_percent,
        average_yield_deviation_percent,
        top_deviations,
        critical_analyses,
    }
}

fn mean_of(
    analyses: &[ProgressDeviationAnalysis],
    value: impl Fn(&ProgressDeviationAnalysis) -> Decimal,
) -> Decimal {
    if analyses.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = analyses.iter().map(value).sum();
    sum / Decimal::from(analyses.len() as i64)
}
