#![forbid(unsafe_code)]

//! Core domain model and engines for the GlucoTwin diabetic digital twin.
//!
//! This crate provides:
//! - Domain types (profiles, forecasts, foods, doses, alerts)
//! - 24-hour glucose forecasting and real-time reading simulation
//! - Food safety analysis and weekly diet planning
//! - Insulin dose calculation and health alerts
//! - Persistence (profile store, forecast CSV export) and configuration
//!
//! All randomness is drawn through [`NoiseSource`], so callers can pass a
//! seeded or fixed source to get reproducible results.

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod noise;
pub mod predictor;
pub mod analysis;
pub mod realtime;
pub mod foods;
pub mod food_safety;
pub mod diet_plan;
pub mod medication;
pub mod profile_store;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use noise::{FixedNoise, NoiseSource, RandomNoise};
pub use predictor::{predict_glucose, PredictionInput};
pub use realtime::{simulate_real_time_data, RealTimeReading};
pub use foods::{build_default_food_table, default_food_table, FoodTable};
pub use food_safety::{FoodSafetyAnalyzer, SafetyLevel, SafetyVerdict};
pub use diet_plan::{generate_weekly_diet_plan, WeeklyDietPlan};
pub use medication::{calculate_insulin_dose, generate_health_alerts};
pub use profile_store::profile_path;
pub use export::write_forecast_csv;
