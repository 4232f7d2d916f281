//! Deviation portfolio reporting service
//!
//! Aggregates season analyses into overall reports: per-farmer portfolios,
//! the system-wide portfolio, and date-window reports, with CSV export.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use shared::{
    analyze_season, build_overall_report, AnalysisScope, CropSeason, DateRange, DeviationLevel,
    DeviationPolicy, DeviationStatus, OverallDeviationReport, ProgressDeviationAnalysis,
};

use super::crop_season::CropSeasonService;

/// Deviation report service
#[derive(Clone)]
pub struct DeviationReportService {
    store: CropSeasonService,
    policy: DeviationPolicy,
}

/// One exported report line
#[derive(Debug, Serialize)]
struct DeviationCsvRow {
    code: String,
    scope: AnalysisScope,
    status: DeviationStatus,
    level: DeviationLevel,
    deviation_percent: Decimal,
    days_behind: i64,
    expected_progress_percent: Decimal,
    actual_progress_percent: Decimal,
    yield_deviation_percent: Option<Decimal>,
}

impl DeviationReportService {
    /// Create a new DeviationReportService instance
    pub fn new(db: PgPool, policy: DeviationPolicy) -> Self {
        Self {
            store: CropSeasonService::new(db),
            policy,
        }
    }

    /// Portfolio over all of one farmer's seasons.
    ///
    /// Callers reach this through their own identity; the reporting window is
    /// the span of the seasons' dates.
    pub async fn farmer_portfolio(&self, farmer_id: Uuid) -> AppResult<OverallDeviationReport> {
        let seasons = self.store.list_farmer_seasons(farmer_id).await?;
        let window = window_spanning(&seasons);
        Ok(self.build_report(&seasons, window))
    }

    /// System-wide portfolio; managers and admins only
    pub async fn system_portfolio(&self, caller: &AuthUser) -> AppResult<OverallDeviationReport> {
        if !caller.role.is_privileged() {
            return Err(AppError::Forbidden(
                "Only managers and admins may view the system portfolio".to_string(),
            ));
        }

        let seasons = self.store.list_all_seasons().await?;
        let window = window_spanning(&seasons);
        Ok(self.build_report(&seasons, window))
    }

    /// Report over seasons started inside a date window.
    ///
    /// Non-privileged callers are always scoped to their own seasons;
    /// privileged callers may pass any farmer filter or none at all.
    pub async fn generate_report(
        &self,
        window: DateRange,
        farmer_filter: Option<Uuid>,
        caller: &AuthUser,
    ) -> AppResult<OverallDeviationReport> {
        let farmer_filter = self.effective_farmer_filter(farmer_filter, caller);
        let seasons = self.store.list_seasons_in_window(window, farmer_filter).await?;
        Ok(self.build_report(&seasons, window))
    }

    /// Same report flattened to CSV, one line per season analysis
    pub async fn generate_report_csv(
        &self,
        window: DateRange,
        farmer_filter: Option<Uuid>,
        caller: &AuthUser,
    ) -> AppResult<String> {
        let farmer_filter = self.effective_farmer_filter(farmer_filter, caller);
        let seasons = self.store.list_seasons_in_window(window, farmer_filter).await?;
        let rows: Vec<DeviationCsvRow> = self
            .analyze_all(&seasons)
            .into_iter()
            .map(|analysis| DeviationCsvRow {
                code: analysis.code.clone(),
                scope: analysis.scope,
                status: analysis.status,
                level: analysis.level,
                deviation_percent: analysis.deviation_percent,
                days_behind: analysis.days_behind,
                expected_progress_percent: analysis.expected_progress_percent,
                actual_progress_percent: analysis.actual_progress_percent,
                yield_deviation_percent: analysis.yield_deviation_percent,
            })
            .collect();

        export_to_csv(&rows)
    }

    fn effective_farmer_filter(
        &self,
        requested: Option<Uuid>,
        caller: &AuthUser,
    ) -> Option<Uuid> {
        if caller.role.is_privileged() {
            requested
        } else {
            Some(caller.user_id)
        }
    }

    fn analyze_all(&self, seasons: &[CropSeason]) -> Vec<ProgressDeviationAnalysis> {
        let as_of = Utc::now().date_naive();
        seasons
            .iter()
            .map(|season| analyze_season(season, &self.policy, as_of))
            .collect()
    }

    fn build_report(&self, seasons: &[CropSeason], window: DateRange) -> OverallDeviationReport {
        build_overall_report(self.analyze_all(seasons), window, &self.policy)
    }
}

/// Reporting window covering every season's dates, falling back to today
fn window_spanning(seasons: &[CropSeason]) -> DateRange {
    let today = Utc::now().date_naive();
    let start = seasons
        .iter()
        .filter_map(|s| s.start_date)
        .min()
        .unwrap_or(today);
    let end = seasons
        .iter()
        .filter_map(|s| s.end_date)
        .max()
        .unwrap_or(today)
        .max(start);
    DateRange::new(start, end)
}

/// Export report rows as CSV
fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in data {
        wtr.serialize(record)
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
    }
    let csv_data = String::from_utf8(
        wtr.into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
    )
    .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
    Ok(csv_data)
}
