//! Core domain types for the GlucoTwin system.
//!
//! This module defines the fundamental types shared by the engines:
//! - The user profile and its enumerations
//! - Forecast points, trend summaries and risk zones
//! - Food table entries
//! - Dose recommendations and health alerts

use crate::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Profile Types
// ============================================================================

/// Kind of diabetes the user manages
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DiabetesType {
    Type1,
    Type2,
    Prediabetes,
}

/// Habitual (or planned) physical activity level
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    Athlete,
}

impl FromStr for DiabetesType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "type1" | "t1" => Ok(DiabetesType::Type1),
            "type2" | "t2" => Ok(DiabetesType::Type2),
            "prediabetes" => Ok(DiabetesType::Prediabetes),
            other => Err(Error::Profile(format!("Unknown diabetes type: {}", other))),
        }
    }
}

impl fmt::Display for DiabetesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiabetesType::Type1 => "type1",
            DiabetesType::Type2 => "type2",
            DiabetesType::Prediabetes => "prediabetes",
        };
        f.write_str(s)
    }
}

impl FromStr for ActivityLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "active" | "high" => Ok(ActivityLevel::Active),
            "athlete" => Ok(ActivityLevel::Athlete),
            other => Err(Error::Profile(format!("Unknown activity level: {}", other))),
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::Athlete => "athlete",
        };
        f.write_str(s)
    }
}

/// User profile collected once and passed into every calculation
///
/// Engines only borrow the profile; none of them mutate it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: u32,
    pub diabetes_type: DiabetesType,
    pub activity: ActivityLevel,
    #[serde(default)]
    pub hba1c: Option<f64>,
    pub current_bg: u32,
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    #[serde(default)]
    pub stress_level: Option<f64>,
}

// ============================================================================
// Forecast Types
// ============================================================================

/// Named contributions to a single forecast point
///
/// `activity` is only set for hours inside the activity window.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct FactorBreakdown {
    pub carb: f64,
    pub insulin: f64,
    pub drift: f64,
    pub variation: f64,
    pub activity: Option<f64>,
    pub circadian: f64,
    pub stress: f64,
    pub sleep: f64,
    pub personalization: f64,
    pub noise: f64,
}

/// One hourly value in a 24-hour forecast
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ForecastPoint {
    /// Offset in hours from the start of the forecast (0-23)
    pub hour: u32,
    /// Glucose in mg/dL
    pub glucose: f64,
    pub factors: FactorBreakdown,
}

/// Direction of a glucose trend
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

impl Trend {
    /// Classify a delta against a symmetric threshold
    pub fn classify(delta: f64, threshold: f64) -> Self {
        if delta > threshold {
            Trend::Rising
        } else if delta < -threshold {
            Trend::Falling
        } else {
            Trend::Stable
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trend::Rising => "rising",
            Trend::Falling => "falling",
            Trend::Stable => "stable",
        };
        f.write_str(s)
    }
}

/// A forecast extreme and the first hour it occurs
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Extreme {
    pub value: f64,
    pub hour: u32,
}

/// Derived summary of a forecast
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrendSummary {
    pub current: f64,
    pub peak: Extreme,
    pub nadir: Extreme,
    pub short_term_trend: Trend,
    pub long_term_trend: Trend,
    /// Population standard deviation, rounded
    pub variability: f64,
    /// Percentage of points in [70, 180], rounded
    pub time_in_range: f64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskKind {
    Hypoglycemia,
    Hyperglycemia,
    Elevated,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskSeverity {
    Mild,
    Moderate,
    Severe,
}

/// An hour of the forecast outside the safe band
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RiskZone {
    pub hour: u32,
    pub kind: RiskKind,
    pub severity: RiskSeverity,
    pub duration_hours: u32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Safety,
    Optimization,
    Lifestyle,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
}

/// Rule-based advice attached to a forecast
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PredictionRecommendation {
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub title: String,
    pub message: String,
    pub action: String,
}

/// Complete output of a glucose forecast
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Forecast {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Wall-clock hour the forecast starts at
    pub start_hour: u32,
    pub points: Vec<ForecastPoint>,
    pub confidence: f64,
    pub trends: TrendSummary,
    pub risk_zones: Vec<RiskZone>,
    pub recommendations: Vec<PredictionRecommendation>,
}

impl Forecast {
    /// The forecast glucose values in hour order
    pub fn glucose_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.glucose).collect()
    }
}

// ============================================================================
// Food Types
// ============================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    Vegetable,
    Protein,
    Dairy,
    Fat,
    Nuts,
    Fruit,
    Starch,
    Grain,
    Sweet,
    Drink,
}

/// Safety flag carried by each food table entry
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SafetyFlag {
    Safe,
    Moderate,
    Unsafe,
}

/// Static nutrition data for one food
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FoodEntry {
    pub name: String,
    pub carbs_per_100g: f64,
    pub glycemic_index: u8,
    pub category: FoodCategory,
    pub fiber_per_100g: f64,
    pub safety: SafetyFlag,
    pub portion: String,
}

// ============================================================================
// Medication Types
// ============================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WarningLevel {
    Warning,
    Danger,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DoseWarning {
    pub level: WarningLevel,
    pub message: String,
}

/// Insulin dose recommendation in units
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DoseRecommendation {
    pub correction_dose: f64,
    pub carb_dose: f64,
    pub iob_adjustment: f64,
    pub total_insulin: f64,
    pub timing: String,
    pub warnings: Vec<DoseWarning>,
    pub sensitivity_factor: f64,
}

/// Trend flags a caller must compute and supply to health alerts
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrendFlags {
    pub is_rising_rapidly: bool,
    pub is_falling_rapidly: bool,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Emergency,
    Warning,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthAlert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub action: String,
    /// 1 is most urgent
    pub priority: u8,
}
