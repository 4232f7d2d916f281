//! Configuration management for the Crop Contract Farming Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with CFP_ prefix

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::DeviationPolicy;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Deviation analysis thresholds
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for validating JWT tokens
    pub secret: String,
}

/// Tunable thresholds for the deviation analysis engine
///
/// Whole-number percentages and day counts; converted into the shared
/// crate's `DeviationPolicy` at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    /// Deviation percent beyond which a result is Ahead/Behind
    pub on_time_band_percent: i64,

    /// Percentage-level bucket bounds (inclusive)
    pub level_low_percent: i64,
    pub level_medium_percent: i64,
    pub level_high_percent: i64,

    /// Days behind beyond which status is Critical
    pub critical_days_behind: i64,

    /// Per-stage day-level bucket bounds (inclusive)
    pub stage_level_low_days: i64,
    pub stage_level_medium_days: i64,
    pub stage_level_high_days: i64,

    /// Fallback per-stage window when a harvest window is missing
    pub default_stage_duration_days: i64,

    /// Canonical number of farming stages
    pub canonical_stage_count: i64,

    /// Yield deviation percent below which the yield recommendation fires
    pub yield_alert_percent: i64,

    /// Bound on the worst-deviations list in overall reports
    pub top_deviation_limit: usize,
}

impl AnalysisConfig {
    /// Materialize the engine policy from the configured thresholds
    pub fn to_policy(&self) -> DeviationPolicy {
        DeviationPolicy {
            on_time_band_percent: Decimal::from(self.on_time_band_percent),
            level_low_percent: Decimal::from(self.level_low_percent),
            level_medium_percent: Decimal::from(self.level_medium_percent),
            level_high_percent: Decimal::from(self.level_high_percent),
            critical_days_behind: self.critical_days_behind,
            stage_level_low_days: self.stage_level_low_days,
            stage_level_medium_days: self.stage_level_medium_days,
            stage_level_high_days: self.stage_level_high_days,
            default_stage_duration_days: self.default_stage_duration_days,
            canonical_stage_count: self.canonical_stage_count,
            yield_alert_percent: Decimal::from(self.yield_alert_percent),
            top_deviation_limit: self.top_deviation_limit,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("CFP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("analysis.on_time_band_percent", 10)?
            .set_default("analysis.level_low_percent", 10)?
            .set_default("analysis.level_medium_percent", 25)?
            .set_default("analysis.level_high_percent", 50)?
            .set_default("analysis.critical_days_behind", 30)?
            .set_default("analysis.stage_level_low_days", 3)?
            .set_default("analysis.stage_level_medium_days", 7)?
            .set_default("analysis.stage_level_high_days", 14)?
            .set_default("analysis.default_stage_duration_days", 30)?
            .set_default("analysis.canonical_stage_count", 5)?
            .set_default("analysis.yield_alert_percent", -10)?
            .set_default("analysis.top_deviation_limit", 10)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (CFP_ prefix)
            .add_source(
                Environment::with_prefix("CFP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
