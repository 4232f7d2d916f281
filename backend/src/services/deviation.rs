//! Progress deviation analysis service
//!
//! Entry points for single-season and single-detail analysis. The service
//! authorizes the caller, fetches a point-in-time snapshot through the crop
//! season service, and hands it to the pure engine in the shared crate.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use shared::{analyze_detail, analyze_season, DeviationPolicy, ProgressDeviationAnalysis};

use super::crop_season::CropSeasonService;

/// Deviation analysis service
#[derive(Clone)]
pub struct DeviationAnalysisService {
    store: CropSeasonService,
    policy: DeviationPolicy,
}

impl DeviationAnalysisService {
    /// Create a new DeviationAnalysisService instance
    pub fn new(db: PgPool, policy: DeviationPolicy) -> Self {
        Self {
            store: CropSeasonService::new(db),
            policy,
        }
    }

    /// Analyze one season. The caller must own the season or hold a
    /// privileged role; otherwise the computation never starts.
    pub async fn analyze_season(
        &self,
        season_id: Uuid,
        caller: &AuthUser,
    ) -> AppResult<ProgressDeviationAnalysis> {
        let season = self.store.get_season(season_id).await?;
        authorize_read(caller, season.farmer_id)?;

        let as_of = Utc::now().date_naive();
        Ok(analyze_season(&season, &self.policy, as_of))
    }

    /// Analyze one detail, scoped by the owning season's farmer
    pub async fn analyze_detail(
        &self,
        detail_id: Uuid,
        caller: &AuthUser,
    ) -> AppResult<ProgressDeviationAnalysis> {
        let owned = self.store.get_detail(detail_id).await?;
        authorize_read(caller, owned.farmer_id)?;

        let as_of = Utc::now().date_naive();
        Ok(analyze_detail(&owned.detail, &self.policy, as_of))
    }
}

/// Owner, manager, or admin may read; everyone else is refused
pub(crate) fn authorize_read(caller: &AuthUser, farmer_id: Uuid) -> AppResult<()> {
    if caller.can_read_farmer(farmer_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the owning farmer, a manager, or an admin may view this analysis".to_string(),
        ))
    }
}
