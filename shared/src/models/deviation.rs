//! Progress deviation analysis output models
//!
//! Everything in this module is computed fresh per request from persisted
//! crop season state and is never stored back.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Directional classification of a deviation result
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeviationStatus {
    OnTime,
    Ahead,
    Behind,
    /// More than the critical day threshold behind schedule, regardless of
    /// the percentage signal
    Critical,
}

impl std::fmt::Display for DeviationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviationStatus::OnTime => write!(f, "On Time"),
            DeviationStatus::Ahead => write!(f, "Ahead"),
            DeviationStatus::Behind => write!(f, "Behind"),
            DeviationStatus::Critical => write!(f, "Critical"),
        }
    }
}

/// Severity bucket derived from deviation magnitude
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeviationLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for DeviationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviationLevel::Low => write!(f, "Low"),
            DeviationLevel::Medium => write!(f, "Medium"),
            DeviationLevel::High => write!(f, "High"),
            DeviationLevel::Critical => write!(f, "Critical"),
        }
    }
}

/// What a deviation analysis covers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisScope {
    Season,
    Detail,
}

/// Schedule deviation of a single recorded farming stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageDeviation {
    pub stage_id: Uuid,
    pub stage_name: String,
    /// 1-based position in the detail's stage sequence
    pub order_index: i32,
    /// Derived expected window; absent when the detail has no harvest-start
    /// anchor to schedule against
    pub expected_start: Option<NaiveDate>,
    pub expected_end: Option<NaiveDate>,
    pub actual_date: Option<NaiveDate>,
    /// Exactly one of days_ahead / days_behind is non-zero for a dated entry
    pub days_ahead: i64,
    pub days_behind: i64,
    pub status: DeviationStatus,
    pub level: DeviationLevel,
}

/// Remediation recommendation categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    /// Schedule is slipping
    Timing,
    /// Harvested yield is falling short of the commitment
    Yield,
    /// The cultivation process itself needs review
    Process,
}

impl std::fmt::Display for RecommendationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendationCategory::Timing => write!(f, "Timing"),
            RecommendationCategory::Yield => write!(f, "Yield"),
            RecommendationCategory::Process => write!(f, "Process"),
        }
    }
}

/// Recommendation urgency
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationPriority {
    Low,
    Medium,
    High,
    Critical,
}

/// A structured remediation item emitted by the rule engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub category: RecommendationCategory,
    pub title: String,
    pub description: String,
    pub priority: RecommendationPriority,
    pub impact: String,
    pub effort: String,
    /// Concrete action checklist, in recommended order
    pub actions: Vec<String>,
}

/// Deviation analysis of one season or one detail
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressDeviationAnalysis {
    /// Season id or detail id, depending on scope
    pub id: Uuid,
    pub code: String,
    pub scope: AnalysisScope,
    pub expected_progress_percent: Decimal,
    pub actual_progress_percent: Decimal,
    pub expected_stage_count: i64,
    pub completed_stage_count: i64,
    /// Highest step index observed so far
    pub current_stage_index: i32,
    /// actual − expected, signed
    pub deviation_percent: Decimal,
    pub days_behind: i64,
    pub status: DeviationStatus,
    pub level: DeviationLevel,
    /// Unset until both expected and actual yields are known
    pub yield_deviation_percent: Option<Decimal>,
    pub stage_deviations: Vec<StageDeviation>,
    pub recommendations: Vec<Recommendation>,
}

impl ProgressDeviationAnalysis {
    /// Magnitude of the percentage deviation
    pub fn deviation_magnitude(&self) -> Decimal {
        self.deviation_percent.abs()
    }
}

/// Aggregated deviation report over many season analyses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallDeviationReport {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub total_crop_seasons: i64,
    pub on_time_seasons: i64,
    pub ahead_seasons: i64,
    pub behind_seasons: i64,
    pub critical_seasons: i64,
    /// Mean of |deviation %| across all analyses
    pub average_deviation_percent: Decimal,
    /// Mean of |yield deviation %|; analyses without a yield deviation are
    /// averaged as zero, which dilutes the signal for unharvested seasons
    pub average_yield_deviation_percent: Decimal,
    /// Worst analyses by |deviation %|, bounded by the policy's top-N limit
    pub top_deviations: Vec<ProgressDeviationAnalysis>,
    /// Every analysis whose status is Critical
    pub critical_analyses: Vec<ProgressDeviationAnalysis>,
}
