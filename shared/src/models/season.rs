//! Crop season models
//!
//! A season is one cultivation cycle for a farmer. Each season carries one or
//! more details (cultivated areas / commitment lines), and each detail
//! accumulates dated progress entries as farming stages are recorded.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One cultivation cycle for a farmer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropSeason {
    pub id: Uuid,
    /// Human-readable season code, e.g. `CS-2024-0012`
    pub code: String,
    pub name: String,
    pub farmer_id: Uuid,
    /// Season start; must precede `end_date` when both are present
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_deleted: bool,
    pub details: Vec<CropSeasonDetail>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CropSeason {
    /// Details that have not been soft-deleted
    pub fn live_details(&self) -> impl Iterator<Item = &CropSeasonDetail> {
        self.details.iter().filter(|d| !d.is_deleted)
    }
}

/// One cultivated area / commitment line within a season
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropSeasonDetail {
    pub id: Uuid,
    /// Line code within the season, e.g. `CS-2024-0012-01`
    pub code: String,
    pub crop_season_id: Uuid,
    /// Cultivated area in rai (1 rai = 1,600 m²)
    pub area_rai: Option<Decimal>,
    pub expected_harvest_start: Option<NaiveDate>,
    pub expected_harvest_end: Option<NaiveDate>,
    pub expected_yield_kg: Option<Decimal>,
    /// Captured when harvesting-stage progress is recorded; null until then
    pub actual_yield_kg: Option<Decimal>,
    pub is_deleted: bool,
    pub progress: Vec<CropProgress>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A dated record that a farming stage occurred for a detail
///
/// The stage reference is resolved by the data layer, so consumers see the
/// catalog code and display name alongside the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropProgress {
    pub id: Uuid,
    pub crop_season_detail_id: Uuid,
    pub stage_id: Uuid,
    pub stage_code: String,
    pub stage_name: String,
    /// 1-based ordering hint within the detail's stage sequence
    pub step_index: Option<i32>,
    /// Calendar date the stage was performed; no time component
    pub progress_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
