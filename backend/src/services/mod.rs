//! Business logic services for the Crop Contract Farming Platform

pub mod crop_season;
pub mod deviation;
pub mod report;

pub use crop_season::CropSeasonService;
pub use deviation::DeviationAnalysisService;
pub use report::DeviationReportService;
