//! HTTP handlers for the Crop Contract Farming Platform

mod crop_season;
mod deviation;
mod health;

pub use crop_season::*;
pub use deviation::*;
pub use health::*;
