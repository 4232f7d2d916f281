//! Progress deviation analysis HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::{DeviationAnalysisService, DeviationReportService};
use crate::AppState;
use shared::DateRange;

/// Query parameters for date-window deviation reports
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    /// Ignored for non-privileged callers, who always see their own seasons
    pub farmer_id: Option<Uuid>,
}

impl ReportQuery {
    fn window(&self) -> Result<DateRange, AppError> {
        if self.from_date > self.to_date {
            return Err(AppError::Validation {
                field: "from_date".to_string(),
                message: "from_date must not be after to_date".to_string(),
            });
        }
        Ok(DateRange::new(self.from_date, self.to_date))
    }
}

/// Analyze one season's progress deviation
pub async fn analyze_season(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(season_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = DeviationAnalysisService::new(state.db.clone(), state.policy.clone());

    match service.analyze_season(season_id, &user.0).await {
        Ok(analysis) => (StatusCode::OK, Json(analysis)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Analyze one detail's progress deviation
pub async fn analyze_detail(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(detail_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = DeviationAnalysisService::new(state.db.clone(), state.policy.clone());

    match service.analyze_detail(detail_id, &user.0).await {
        Ok(analysis) => (StatusCode::OK, Json(analysis)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Portfolio report over the current farmer's seasons
pub async fn my_portfolio(State(state): State<AppState>, user: CurrentUser) -> impl IntoResponse {
    let service = DeviationReportService::new(state.db.clone(), state.policy.clone());

    match service.farmer_portfolio(user.0.user_id).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// System-wide portfolio report (managers and admins)
pub async fn system_portfolio(
    State(state): State<AppState>,
    user: CurrentUser,
) -> impl IntoResponse {
    let service = DeviationReportService::new(state.db.clone(), state.policy.clone());

    match service.system_portfolio(&user.0).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Deviation report over seasons started inside a date window
pub async fn generate_report(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> impl IntoResponse {
    let service = DeviationReportService::new(state.db.clone(), state.policy.clone());

    let window = match query.window() {
        Ok(window) => window,
        Err(e) => return e.into_response(),
    };

    match service.generate_report(window, query.farmer_id, &user.0).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Export the same report as CSV
pub async fn export_report(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> impl IntoResponse {
    let service = DeviationReportService::new(state.db.clone(), state.policy.clone());

    let window = match query.window() {
        Ok(window) => window,
        Err(e) => return e.into_response(),
    };

    match service
        .generate_report_csv(window, query.farmer_id, &user.0)
        .await
    {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"deviation-report.csv\"",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
