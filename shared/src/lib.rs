//! Shared types and domain logic for the Crop Contract Farming Platform
//!
//! This crate contains the models shared between the backend and other
//! components of the system, together with the progress deviation analysis
//! engine. The engine is pure: it works on point-in-time snapshots of crop
//! season records and never touches a clock, a database, or any other I/O.

pub mod analysis;
pub mod models;
pub mod types;
pub mod validation;

pub use analysis::*;
pub use models::*;
pub use types::*;
pub use validation::*;
