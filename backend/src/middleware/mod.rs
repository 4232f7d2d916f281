//! Middleware for the Crop Contract Farming Platform

pub mod auth;

pub use auth::{auth_middleware, AuthUser, CurrentUser};
