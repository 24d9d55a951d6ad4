//! Insulin dose arithmetic and glucose health alerts.
//!
//! Dose rules exist for type 1 and type 2 only. Prediabetes has no rule, so
//! `calculate_insulin_dose` returns `None`: no recommendation, not an error.

use crate::{
    ActivityLevel, AlertKind, DiabetesType, DoseRecommendation, DoseWarning, HealthAlert,
    TrendFlags, UserProfile, WarningLevel,
};

/// Per-type insulin rule
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InsulinRule {
    /// mg/dL one unit lowers glucose by
    pub correction_factor: f64,
    /// Grams of carbs one unit covers
    pub carb_ratio: f64,
    pub target_glucose: f64,
    pub max_single_dose: f64,
}

impl InsulinRule {
    pub fn for_type(diabetes_type: DiabetesType) -> Option<Self> {
        match diabetes_type {
            DiabetesType::Type1 => Some(Self {
                correction_factor: 50.0,
                carb_ratio: 15.0,
                target_glucose: 100.0,
                max_single_dose: 10.0,
            }),
            DiabetesType::Type2 => Some(Self {
                correction_factor: 30.0,
                carb_ratio: 10.0,
                target_glucose: 120.0,
                max_single_dose: 6.0,
            }),
            DiabetesType::Prediabetes => None,
        }
    }
}

const IOB_WEIGHT: f64 = 0.5;
const SENSITIVITY_MIN: f64 = 0.3;
const SENSITIVITY_MAX: f64 = 2.0;

fn age_factor(age: u32) -> f64 {
    match age {
        18..=30 => 1.0,
        // Under-18 shares the 31-50 bracket
        _ if age <= 50 => 0.9,
        _ if age <= 70 => 0.8,
        _ => 0.7,
    }
}

fn activity_factor(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 1.0,
        ActivityLevel::Light => 0.9,
        ActivityLevel::Moderate => 0.8,
        ActivityLevel::Active => 0.7,
        ActivityLevel::Athlete => 0.6,
    }
}

/// Product of age, activity and weight factors, clamped to [0.3, 2.0]
pub fn sensitivity_factor(profile: &UserProfile) -> f64 {
    let weight_factor = profile.weight_kg / 70.0;
    (age_factor(profile.age) * activity_factor(profile.activity) * weight_factor)
        .clamp(SENSITIVITY_MIN, SENSITIVITY_MAX)
}

fn timing(diabetes_type: DiabetesType) -> &'static str {
    match diabetes_type {
        DiabetesType::Type1 => "Take 15-20 minutes before eating",
        DiabetesType::Type2 => "Take with your meal or immediately after",
        DiabetesType::Prediabetes => "Consult your doctor for timing instructions",
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Recommend an insulin dose in units
///
/// `None` when the profile's diabetes type has no configured rule.
pub fn calculate_insulin_dose(
    profile: &UserProfile,
    current_glucose: f64,
    planned_carbs: f64,
    insulin_on_board: f64,
) -> Option<DoseRecommendation> {
    let Some(rule) = InsulinRule::for_type(profile.diabetes_type) else {
        tracing::debug!(
            "No insulin rule for {}; skipping dose recommendation",
            profile.diabetes_type
        );
        return None;
    };

    let sensitivity = sensitivity_factor(profile);
    let correction_factor = rule.correction_factor * sensitivity;
    let carb_ratio = rule.carb_ratio * sensitivity;

    let correction_dose = if current_glucose > rule.target_glucose {
        ((current_glucose - rule.target_glucose) / correction_factor).max(0.0)
    } else {
        0.0
    };
    let carb_dose = planned_carbs / carb_ratio;
    let iob_adjustment = (insulin_on_board * IOB_WEIGHT).max(0.0);

    let total = (correction_dose + carb_dose - iob_adjustment)
        .max(0.0)
        .min(rule.max_single_dose);

    let warnings = generate_warnings(total, current_glucose, planned_carbs);

    tracing::debug!(
        sensitivity,
        correction_dose,
        carb_dose,
        iob_adjustment,
        total,
        warnings = warnings.len(),
        "Insulin dose calculated"
    );

    Some(DoseRecommendation {
        correction_dose: round1(correction_dose),
        carb_dose: round1(carb_dose),
        iob_adjustment: round1(iob_adjustment),
        total_insulin: round1(total),
        timing: timing(profile.diabetes_type).into(),
        warnings,
        sensitivity_factor: (sensitivity * 100.0).round() / 100.0,
    })
}

/// Independent threshold checks; every one that applies is returned
fn generate_warnings(total: f64, current_glucose: f64, planned_carbs: f64) -> Vec<DoseWarning> {
    let mut warnings = Vec::new();

    if current_glucose < 80.0 && total > 0.0 {
        warnings.push(DoseWarning {
            level: WarningLevel::Danger,
            message: "HYPOGLYCEMIA RISK: Glucose is low. Consider reducing insulin or having carbs first.".into(),
        });
    }
    if total > 8.0 {
        warnings.push(DoseWarning {
            level: WarningLevel::Warning,
            message: "HIGH DOSE: This is a significant insulin dose. Double-check your calculations.".into(),
        });
    }
    if planned_carbs > 75.0 {
        warnings.push(DoseWarning {
            level: WarningLevel::Warning,
            message: "HIGH CARB MEAL: Consider spreading carbs throughout the day.".into(),
        });
    }
    if current_glucose > 300.0 {
        warnings.push(DoseWarning {
            level: WarningLevel::Danger,
            message: "EMERGENCY: Very high glucose. Contact your healthcare provider immediately.".into(),
        });
    }

    warnings
}

/// Alerts for the current glucose plus caller-supplied trend flags
///
/// This engine never derives the flags; pass `None` when they are unknown.
pub fn generate_health_alerts(
    profile: &UserProfile,
    current_glucose: f64,
    trends: Option<&TrendFlags>,
) -> Vec<HealthAlert> {
    let mut alerts = Vec::new();

    if current_glucose < 70.0 {
        alerts.push(HealthAlert {
            kind: AlertKind::Emergency,
            title: "Hypoglycemia Alert".into(),
            message: "Your glucose is dangerously low. Consume 15g fast-acting carbs immediately.".into(),
            action: "Take glucose tablets, juice, or regular soda. Recheck in 15 minutes.".into(),
            priority: 1,
        });
    } else if current_glucose < 90.0 {
        alerts.push(HealthAlert {
            kind: AlertKind::Warning,
            title: "Low Glucose Warning".into(),
            message: "Your glucose is approaching low levels. Have a small snack if active.".into(),
            action: "Monitor closely and have carbs available.".into(),
            priority: 2,
        });
    }

    if current_glucose > 250.0 {
        alerts.push(HealthAlert {
            kind: AlertKind::Emergency,
            title: "Hyperglycemia Alert".into(),
            message: "Your glucose is very high. Check for ketones if type 1 diabetes.".into(),
            action: "Drink water, take correction dose, contact doctor if persistent.".into(),
            priority: 1,
        });
    } else if current_glucose > 180.0 {
        alerts.push(HealthAlert {
            kind: AlertKind::Warning,
            title: "Elevated Glucose".into(),
            message: "Your glucose is above target range.".into(),
            action: "Consider light activity and avoid high-carb foods.".into(),
            priority: 2,
        });
    }

    if let Some(flags) = trends {
        if flags.is_rising_rapidly {
            alerts.push(HealthAlert {
                kind: AlertKind::Warning,
                title: "Rapid Rise Detected".into(),
                message: "Your glucose is rising quickly.".into(),
                action: "Consider taking rapid-acting insulin if prescribed.".into(),
                priority: 2,
            });
        }
        if flags.is_falling_rapidly {
            alerts.push(HealthAlert {
                kind: AlertKind::Warning,
                title: "Rapid Drop Detected".into(),
                message: "Your glucose is falling quickly.".into(),
                action: "Have fast-acting carbs ready and monitor closely.".into(),
                priority: 2,
            });
        }
    }

    tracing::debug!(
        diabetes_type = %profile.diabetes_type,
        current_glucose,
        alerts = alerts.len(),
        "Health alerts generated"
    );

    alerts
}
