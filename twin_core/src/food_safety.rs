//! Food safety analysis against current glucose.
//!
//! Projects the single-step glucose impact of a portion and classifies it
//! with a strict priority ladder. Projected values are not clamped.

use crate::foods::FoodTable;
use crate::{FoodCategory, FoodEntry, SafetyFlag};
use serde::{Deserialize, Serialize};
use std::fmt;

const HYPO_THRESHOLD: f64 = 70.0;
const TARGET_MAX: f64 = 180.0;
const HYPER_THRESHOLD: f64 = 250.0;
const HIGH_CARB_PORTION: f64 = 30.0;
const REDUCED_PORTION_CARBS: f64 = 15.0;
const HIGH_GI: u8 = 55;

const UNKNOWN_FOOD_MESSAGE: &str = "Food not found in database. Please consult your nutritionist.";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SafetyLevel {
    Danger,
    Warning,
    Moderate,
    Safe,
    Unknown,
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SafetyLevel::Danger => "danger",
            SafetyLevel::Warning => "warning",
            SafetyLevel::Moderate => "moderate",
            SafetyLevel::Safe => "safe",
            SafetyLevel::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Nutrition and glucose numbers for a matched food
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GlucoseImpact {
    /// Table entry the query resolved to
    pub matched_food: String,
    pub category: FoodCategory,
    pub glycemic_index: u8,
    /// Net carbs in grams, rounded to 0.1
    pub net_carbs: f64,
    pub glycemic_load: f64,
    /// mg/dL, rounded
    pub glucose_impact: f64,
    /// mg/dL, rounded
    pub projected_glucose: f64,
}

/// Result of a food safety check
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SafetyVerdict {
    pub food: String,
    pub quantity_grams: f64,
    pub safety: SafetyLevel,
    pub confidence: f64,
    pub message: String,
    /// `None` when the food is not in the table
    pub impact: Option<GlucoseImpact>,
    pub recommendations: Vec<String>,
}

/// Analyzer bound to an immutable food table
///
/// Holds no profile: every call receives what it needs explicitly.
#[derive(Clone, Copy, Debug)]
pub struct FoodSafetyAnalyzer<'a> {
    table: &'a FoodTable,
}

impl<'a> FoodSafetyAnalyzer<'a> {
    pub fn new(table: &'a FoodTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'a FoodTable {
        self.table
    }

    /// Analyze eating `quantity_grams` of a food at `current_glucose`
    ///
    /// Unknown foods produce an `Unknown` verdict with zero confidence.
    pub fn analyze(
        &self,
        food_name: &str,
        quantity_grams: f64,
        current_glucose: f64,
        insulin_on_board: f64,
    ) -> SafetyVerdict {
        let Some(food) = self.table.find(food_name) else {
            tracing::info!("Food {:?} not found in table", food_name);
            return SafetyVerdict {
                food: food_name.to_string(),
                quantity_grams,
                safety: SafetyLevel::Unknown,
                confidence: 0.0,
                message: UNKNOWN_FOOD_MESSAGE.into(),
                impact: None,
                recommendations: Vec::new(),
            };
        };

        let net_carbs = net_carbs(food, quantity_grams);
        let glycemic_load = glycemic_load(net_carbs, food.glycemic_index);
        let impact = glucose_impact(glycemic_load);
        let projected = current_glucose + impact - insulin_on_board;

        let (safety, confidence, message) = classify(projected, food, net_carbs);
        let recommendations = recommendations(safety, food, quantity_grams, net_carbs);

        tracing::debug!(
            food = %food.name,
            net_carbs,
            impact,
            projected,
            %safety,
            "Food safety analyzed"
        );

        SafetyVerdict {
            food: food_name.to_string(),
            quantity_grams,
            safety,
            confidence,
            message: message.into(),
            impact: Some(GlucoseImpact {
                matched_food: food.name.clone(),
                category: food.category,
                glycemic_index: food.glycemic_index,
                net_carbs: (net_carbs * 10.0).round() / 10.0,
                glycemic_load: (glycemic_load * 10.0).round() / 10.0,
                glucose_impact: impact.round(),
                projected_glucose: projected.round(),
            }),
            recommendations,
        }
    }
}

/// Net carbs in grams for a portion: `max(0, carbs - fiber) * grams / 100`
pub fn net_carbs(food: &FoodEntry, quantity_grams: f64) -> f64 {
    (food.carbs_per_100g - food.fiber_per_100g).max(0.0) * quantity_grams / 100.0
}

pub fn glycemic_load(net_carbs: f64, glycemic_index: u8) -> f64 {
    net_carbs * f64::from(glycemic_index) / 100.0
}

/// Tiered mg/dL impact of a glycemic load
pub fn glucose_impact(glycemic_load: f64) -> f64 {
    let multiplier = if glycemic_load < 10.0 {
        1.5
    } else if glycemic_load < 20.0 {
        2.0
    } else {
        2.5
    };
    (glycemic_load * multiplier).max(0.0)
}

/// First matching rung wins
fn classify(projected: f64, food: &FoodEntry, net_carbs: f64) -> (SafetyLevel, f64, &'static str) {
    if projected < HYPO_THRESHOLD {
        (
            SafetyLevel::Danger,
            0.95,
            "DANGER: This may cause hypoglycemia! Avoid or pair with slower carbs.",
        )
    } else if projected > HYPER_THRESHOLD {
        (
            SafetyLevel::Danger,
            0.90,
            "HIGH RISK: This will likely cause dangerous hyperglycemia!",
        )
    } else if projected > TARGET_MAX {
        (
            SafetyLevel::Warning,
            0.85,
            "CAUTION: This may raise glucose above target range.",
        )
    } else if food.safety == SafetyFlag::Unsafe {
        (
            SafetyLevel::Warning,
            0.80,
            "LIMITED: High GI food. Consume in very small quantities.",
        )
    } else if net_carbs > HIGH_CARB_PORTION {
        (
            SafetyLevel::Moderate,
            0.75,
            "MODERATE: High carb content. Monitor your glucose carefully.",
        )
    } else {
        (
            SafetyLevel::Safe,
            0.90,
            "SAFE: This food fits well within your target range.",
        )
    }
}

fn recommendations(
    safety: SafetyLevel,
    food: &FoodEntry,
    quantity_grams: f64,
    net_carbs: f64,
) -> Vec<String> {
    let base: [&str; 3] = match safety {
        // Unmatched foods carry no nutrition data to advise on
        SafetyLevel::Unknown => return Vec::new(),
        SafetyLevel::Danger => [
            "AVOID this food in current conditions",
            "Check glucose immediately if consumed",
            "Have fast-acting carbs ready if glucose drops",
        ],
        SafetyLevel::Warning => [
            "Reduce quantity to stay in safe range",
            "Consume with protein/fat to slow absorption",
            "Monitor glucose 1-2 hours after eating",
        ],
        SafetyLevel::Moderate => [
            "Consider pairing with lean protein",
            "Drink plenty of water",
            "Light activity after eating may help",
        ],
        SafetyLevel::Safe => [
            "Excellent choice for stable glucose",
            "Continue with your regular monitoring",
            "Perfect for maintaining healthy levels",
        ],
    };
    let mut recommendations: Vec<String> = base.iter().map(|s| s.to_string()).collect();

    if net_carbs > REDUCED_PORTION_CARBS && safety != SafetyLevel::Safe {
        let reduced = (REDUCED_PORTION_CARBS / net_carbs * quantity_grams).floor();
        recommendations.push(format!(
            "Try {}g instead of {}g for better control",
            reduced, quantity_grams
        ));
    }

    if food.glycemic_index > HIGH_GI {
        recommendations.push(format!(
            "Alternative: Try {}",
            suggest_alternative(food.category)
        ));
    }

    recommendations
}

/// Lower-GI swap for a food category
pub fn suggest_alternative(category: FoodCategory) -> &'static str {
    match category {
        FoodCategory::Grain => "quinoa or barley",
        FoodCategory::Fruit => "berries or apple",
        FoodCategory::Starch => "sweet potato or legumes",
        FoodCategory::Sweet => "sugar-free options",
        FoodCategory::Drink => "water or unsweetened tea",
        _ => "lower GI options",
    }
}
