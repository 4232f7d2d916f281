//! Crop season data access
//!
//! Read side for the deviation analysis engine (seasons, details, progress
//! history with stage navigation resolved) plus progress recording, which is
//! how growers log farming stages and, at the harvesting stage, capture
//! actual yield.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::{
    validate_step_index, validate_yield, CropProgress, CropSeason, CropSeasonDetail, DateRange,
    Stage,
};

/// Crop season service for reading season state and recording progress
#[derive(Clone)]
pub struct CropSeasonService {
    db: PgPool,
}

/// Database row for a crop season
#[derive(Debug, sqlx::FromRow)]
struct SeasonRow {
    id: Uuid,
    code: String,
    name: String,
    farmer_id: Uuid,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Database row for a season detail
#[derive(Debug, sqlx::FromRow)]
struct DetailRow {
    id: Uuid,
    code: String,
    crop_season_id: Uuid,
    area_rai: Option<Decimal>,
    expected_harvest_start: Option<NaiveDate>,
    expected_harvest_end: Option<NaiveDate>,
    expected_yield_kg: Option<Decimal>,
    actual_yield_kg: Option<Decimal>,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Database row for a progress entry with its stage resolved
#[derive(Debug, sqlx::FromRow)]
struct ProgressRow {
    id: Uuid,
    crop_season_detail_id: Uuid,
    stage_id: Uuid,
    stage_code: String,
    stage_name: String,
    step_index: Option<i32>,
    progress_date: Option<NaiveDate>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProgressRow> for CropProgress {
    fn from(row: ProgressRow) -> Self {
        CropProgress {
            id: row.id,
            crop_season_detail_id: row.crop_season_detail_id,
            stage_id: row.stage_id,
            stage_code: row.stage_code,
            stage_name: row.stage_name,
            step_index: row.step_index,
            progress_date: row.progress_date,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

/// A detail with the owning season's farmer attached
#[derive(Debug, Clone)]
pub struct DetailWithOwner {
    pub detail: CropSeasonDetail,
    pub farmer_id: Uuid,
}

/// Input for recording a progress entry
#[derive(Debug, Deserialize, Validate)]
pub struct RecordProgressInput {
    pub stage_id: Uuid,
    pub step_index: Option<i32>,
    pub progress_date: Option<NaiveDate>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    /// Harvested amount; only consumed when the stage is the harvesting stage
    pub actual_yield_kg: Option<Decimal>,
}

impl CropSeasonService {
    /// Create a new CropSeasonService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get one season with its live details and full progress history
    pub async fn get_season(&self, season_id: Uuid) -> AppResult<CropSeason> {
        let row = sqlx::query_as::<_, SeasonRow>(
            r#"
            SELECT id, code, name, farmer_id, start_date, end_date, is_deleted,
                   created_at, updated_at
            FROM crop_seasons
            WHERE id = $1 AND is_deleted = false
            "#,
        )
        .bind(season_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Crop season".to_string()))?;

        let mut seasons = self.assemble_seasons(vec![row]).await?;
        Ok(seasons.remove(0))
    }

    /// Get one detail with its progress history and owning season identity
    pub async fn get_detail(&self, detail_id: Uuid) -> AppResult<DetailWithOwner> {
        #[derive(Debug, sqlx::FromRow)]
        struct DetailOwnerRow {
            id: Uuid,
            code: String,
            crop_season_id: Uuid,
            area_rai: Option<Decimal>,
            expected_harvest_start: Option<NaiveDate>,
            expected_harvest_end: Option<NaiveDate>,
            expected_yield_kg: Option<Decimal>,
            actual_yield_kg: Option<Decimal>,
            is_deleted: bool,
            created_at: DateTime<Utc>,
            updated_at: DateTime<Utc>,
            farmer_id: Uuid,
        }

        let row = sqlx::query_as::<_, DetailOwnerRow>(
            r#"
            SELECT d.id, d.code, d.crop_season_id, d.area_rai,
                   d.expected_harvest_start, d.expected_harvest_end,
                   d.expected_yield_kg, d.actual_yield_kg, d.is_deleted,
                   d.created_at, d.updated_at,
                   s.farmer_id
            FROM crop_season_details d
            JOIN crop_seasons s ON s.id = d.crop_season_id
            WHERE d.id = $1 AND d.is_deleted = false AND s.is_deleted = false
            "#,
        )
        .bind(detail_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Crop season detail".to_string()))?;

        let progress = self.load_progress(&[row.id]).await?.remove(&row.id).unwrap_or_default();

        Ok(DetailWithOwner {
            detail: CropSeasonDetail {
                id: row.id,
                code: row.code,
                crop_season_id: row.crop_season_id,
                area_rai: row.area_rai,
                expected_harvest_start: row.expected_harvest_start,
                expected_harvest_end: row.expected_harvest_end,
                expected_yield_kg: row.expected_yield_kg,
                actual_yield_kg: row.actual_yield_kg,
                is_deleted: row.is_deleted,
                progress,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            farmer_id: row.farmer_id,
        })
    }

    /// List all of a farmer's seasons with details and progress
    pub async fn list_farmer_seasons(&self, farmer_id: Uuid) -> AppResult<Vec<CropSeason>> {
        let rows = sqlx::query_as::<_, SeasonRow>(
            r#"
            SELECT id, code, name, farmer_id, start_date, end_date, is_deleted,
                   created_at, updated_at
            FROM crop_seasons
            WHERE farmer_id = $1 AND is_deleted = false
            ORDER BY start_date DESC NULLS LAST, code
            "#,
        )
        .bind(farmer_id)
        .fetch_all(&self.db)
        .await?;

        self.assemble_seasons(rows).await
    }

    /// List every live season on the platform
    pub async fn list_all_seasons(&self) -> AppResult<Vec<CropSeason>> {
        let rows = sqlx::query_as::<_, SeasonRow>(
            r#"
            SELECT id, code, name, farmer_id, start_date, end_date, is_deleted,
                   created_at, updated_at
            FROM crop_seasons
            WHERE is_deleted = false
            ORDER BY start_date DESC NULLS LAST, code
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        self.assemble_seasons(rows).await
    }

    /// List seasons started inside a date window, optionally farmer-scoped
    pub async fn list_seasons_in_window(
        &self,
        window: DateRange,
        farmer_id: Option<Uuid>,
    ) -> AppResult<Vec<CropSeason>> {
        let rows = match farmer_id {
            Some(farmer_id) => {
                sqlx::query_as::<_, SeasonRow>(
                    r#"
                    SELECT id, code, name, farmer_id, start_date, end_date, is_deleted,
                           created_at, updated_at
                    FROM crop_seasons
                    WHERE is_deleted = false
                      AND farmer_id = $1
                      AND start_date BETWEEN $2 AND $3
                    ORDER BY start_date, code
                    "#,
                )
                .bind(farmer_id)
                .bind(window.start)
                .bind(window.end)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, SeasonRow>(
                    r#"
                    SELECT id, code, name, farmer_id, start_date, end_date, is_deleted,
                           created_at, updated_at
                    FROM crop_seasons
                    WHERE is_deleted = false
                      AND start_date BETWEEN $1 AND $2
                    ORDER BY start_date, code
                    "#,
                )
                .bind(window.start)
                .bind(window.end)
                .fetch_all(&self.db)
                .await?
            }
        };

        self.assemble_seasons(rows).await
    }

    /// Record a farming stage for a detail.
    ///
    /// When the recorded stage is the harvesting stage and a yield amount is
    /// supplied, the detail's actual yield is captured in the same
    /// transaction.
    pub async fn record_progress(
        &self,
        detail_id: Uuid,
        input: RecordProgressInput,
    ) -> AppResult<CropProgress> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        if let Some(step_index) = input.step_index {
            validate_step_index(step_index)
                .map_err(|e| AppError::ValidationError(e.to_string()))?;
        }
        if let Some(yield_kg) = input.actual_yield_kg {
            validate_yield(yield_kg).map_err(|e| AppError::ValidationError(e.to_string()))?;
        }

        // Detail must exist and be live
        let detail_exists = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM crop_season_details d
            JOIN crop_seasons s ON s.id = d.crop_season_id
            WHERE d.id = $1 AND d.is_deleted = false AND s.is_deleted = false
            "#,
        )
        .bind(detail_id)
        .fetch_one(&self.db)
        .await?;

        if detail_exists == 0 {
            return Err(AppError::NotFound("Crop season detail".to_string()));
        }

        let stage = sqlx::query_as::<_, (Uuid, String, String, i32)>(
            "SELECT id, code, name, display_order FROM crop_stages WHERE id = $1",
        )
        .bind(input.stage_id)
        .fetch_optional(&self.db)
        .await?
        .map(|(id, code, name, display_order)| Stage {
            id,
            code,
            name,
            display_order,
        })
        .ok_or_else(|| AppError::NotFound("Stage".to_string()))?;

        let mut tx = self.db.begin().await?;

        let progress_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO crop_progresses (crop_season_detail_id, stage_id, step_index,
                                         progress_date, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(detail_id)
        .bind(stage.id)
        .bind(input.step_index)
        .bind(input.progress_date)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateEntry("progress entry".to_string())
            }
            _ => AppError::DatabaseError(e),
        })?;

        if stage.is_harvesting() {
            if let Some(yield_kg) = input.actual_yield_kg {
                sqlx::query("UPDATE crop_season_details SET actual_yield_kg = $1 WHERE id = $2")
                    .bind(yield_kg)
                    .bind(detail_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        let row = sqlx::query_as::<_, ProgressRow>(
            r#"
            SELECT cp.id, cp.crop_season_detail_id, cp.stage_id,
                   st.code as stage_code, st.name as stage_name,
                   cp.step_index, cp.progress_date, cp.notes, cp.created_at
            FROM crop_progresses cp
            JOIN crop_stages st ON st.id = cp.stage_id
            WHERE cp.id = $1
            "#,
        )
        .bind(progress_id)
        .fetch_one(&self.db)
        .await?;

        Ok(CropProgress::from(row))
    }

    /// Attach details and progress histories to season rows
    async fn assemble_seasons(&self, rows: Vec<SeasonRow>) -> AppResult<Vec<CropSeason>> {
        let season_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let detail_rows = sqlx::query_as::<_, DetailRow>(
            r#"
            SELECT id, code, crop_season_id, area_rai,
                   expected_harvest_start, expected_harvest_end,
                   expected_yield_kg, actual_yield_kg, is_deleted,
                   created_at, updated_at
            FROM crop_season_details
            WHERE crop_season_id = ANY($1) AND is_deleted = false
            ORDER BY code
            "#,
        )
        .bind(&season_ids)
        .fetch_all(&self.db)
        .await?;

        let detail_ids: Vec<Uuid> = detail_rows.iter().map(|r| r.id).collect();
        let mut progress_by_detail = self.load_progress(&detail_ids).await?;

        let mut details_by_season: HashMap<Uuid, Vec<CropSeasonDetail>> = HashMap::new();
        for row in detail_rows {
            let progress = progress_by_detail.remove(&row.id).unwrap_or_default();
            details_by_season
                .entry(row.crop_season_id)
                .or_default()
                .push(CropSeasonDetail {
                    id: row.id,
                    code: row.code,
                    crop_season_id: row.crop_season_id,
                    area_rai: row.area_rai,
                    expected_harvest_start: row.expected_harvest_start,
                    expected_harvest_end: row.expected_harvest_end,
                    expected_yield_kg: row.expected_yield_kg,
                    actual_yield_kg: row.actual_yield_kg,
                    is_deleted: row.is_deleted,
                    progress,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                });
        }

        Ok(rows
            .into_iter()
            .map(|row| CropSeason {
                details: details_by_season.remove(&row.id).unwrap_or_default(),
                id: row.id,
                code: row.code,
                name: row.name,
                farmer_id: row.farmer_id,
                start_date: row.start_date,
                end_date: row.end_date,
                is_deleted: row.is_deleted,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }

    /// Load progress entries for a set of details, stage navigation resolved,
    /// ordered by step index then recording time
    async fn load_progress(
        &self,
        detail_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Vec<CropProgress>>> {
        if detail_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ProgressRow>(
            r#"
            SELECT cp.id, cp.crop_season_detail_id, cp.stage_id,
                   st.code as stage_code, st.name as stage_name,
                   cp.step_index, cp.progress_date, cp.notes, cp.created_at
            FROM crop_progresses cp
            JOIN crop_stages st ON st.id = cp.stage_id
            WHERE cp.crop_season_detail_id = ANY($1)
            ORDER BY cp.step_index NULLS LAST, cp.created_at
            "#,
        )
        .bind(detail_ids)
        .fetch_all(&self.db)
        .await?;

        let mut by_detail: HashMap<Uuid, Vec<CropProgress>> = HashMap::new();
        for row in rows {
            by_detail
                .entry(row.crop_season_detail_id)
                .or_default()
                .push(CropProgress::from(row));
        }
        Ok(by_detail)
    }
}
