//! Farming stage catalog models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stage code that triggers actual-yield capture when progress is recorded
pub const HARVESTING_STAGE_CODE: &str = "harvesting";

/// A named step in the farming process (static catalog entry)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stage {
    pub id: Uuid,
    /// Stable machine-readable code, e.g. `planting`, `flowering`, `harvesting`
    pub code: String,
    pub name: String,
    /// Position in the canonical farming sequence
    pub display_order: i32,
}

impl Stage {
    /// Whether recording this stage should capture the detail's actual yield
    pub fn is_harvesting(&self) -> bool {
        self.code == HARVESTING_STAGE_CODE
    }
}

