//! Database models for the Crop Contract Farming Platform
//!
//! Re-exports models from the shared crate and adds backend-specific models

pub use shared::models::*;
