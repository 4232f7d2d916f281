//! Crop season HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::crop_season::{CropSeasonService, RecordProgressInput};
use crate::services::deviation::authorize_read;
use crate::AppState;

/// List the current farmer's seasons
pub async fn list_my_seasons(
    State(state): State<AppState>,
    user: CurrentUser,
) -> impl IntoResponse {
    let service = CropSeasonService::new(state.db.clone());

    match service.list_farmer_seasons(user.0.user_id).await {
        Ok(seasons) => (
            StatusCode::OK,
            Json(serde_json::json!({ "crop_seasons": seasons })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific season with its details and progress history
pub async fn get_season(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(season_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = CropSeasonService::new(state.db.clone());

    let season = match service.get_season(season_id).await {
        Ok(season) => season,
        Err(e) => return e.into_response(),
    };
    if let Err(e) = authorize_read(&user.0, season.farmer_id) {
        return e.into_response();
    }

    (StatusCode::OK, Json(season)).into_response()
}

/// Record a farming stage for a detail
pub async fn record_progress(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(detail_id): Path<Uuid>,
    Json(input): Json<RecordProgressInput>,
) -> impl IntoResponse {
    let service = CropSeasonService::new(state.db.clone());

    // Only the owning farmer (or a privileged role) may log progress
    let owned = match service.get_detail(detail_id).await {
        Ok(owned) => owned,
        Err(e) => return e.into_response(),
    };
    if let Err(e) = authorize_read(&user.0, owned.farmer_id) {
        return e.into_response();
    }

    match service.record_progress(detail_id, input).await {
        Ok(progress) => (StatusCode::CREATED, Json(progress)).into_response(),
        Err(e) => e.into_response(),
    }
}
