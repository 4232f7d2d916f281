//! Domain models for the Crop Contract Farming Platform

mod deviation;
mod season;
mod stage;
mod user;

pub use deviation::*;
pub use season::*;
pub use stage::*;
pub use user::*;
