//! MathRent Lending Management System
//!
//! A Rust implementation of the MathRent university lending server,
//! providing a REST JSON API for equipment, room, and attendance-slot
//! loans with staff-side approval arbitration.

use std::sync::Arc;

pub mod api;
pub mod arbitration;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
