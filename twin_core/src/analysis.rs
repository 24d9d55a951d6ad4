//! Forecast post-processing: trends, risk zones, advice and confidence.

use crate::{
    DiabetesType, Extreme, ForecastPoint, PredictionRecommendation, Priority,
    RecommendationKind, RiskKind, RiskSeverity, RiskZone, Trend, TrendSummary, UserProfile,
};

const SHORT_TERM_HOUR: usize = 2;
const LONG_TERM_HOUR: usize = 12;
const SHORT_TERM_THRESHOLD: f64 = 10.0;
const LONG_TERM_THRESHOLD: f64 = 20.0;

const TARGET_LOW: f64 = 70.0;
const TARGET_HIGH: f64 = 180.0;
const HYPO_SEVERE: f64 = 55.0;
const HYPER: f64 = 250.0;
const HYPER_SEVERE: f64 = 300.0;

const TIME_IN_RANGE_GOAL: f64 = 80.0;
const PEAK_ACTIVITY_TRIGGER: f64 = 200.0;

/// Summarize extremes, direction, spread and time in range
///
/// Expects a non-empty forecast; the trend lookups fall back to the last
/// point when the forecast is shorter than the lookahead.
pub fn analyze_trends(points: &[ForecastPoint]) -> TrendSummary {
    let values: Vec<f64> = points.iter().map(|p| p.glucose).collect();
    let current = values.first().copied().unwrap_or_default();

    let peak = first_extreme(points, |candidate, best| candidate > best);
    let nadir = first_extreme(points, |candidate, best| candidate < best);

    let at = |idx: usize| values.get(idx).or(values.last()).copied().unwrap_or(current);
    let short_term_change = at(SHORT_TERM_HOUR) - current;
    let long_term_change = at(LONG_TERM_HOUR) - current;

    TrendSummary {
        current,
        peak,
        nadir,
        short_term_trend: Trend::classify(short_term_change, SHORT_TERM_THRESHOLD),
        long_term_trend: Trend::classify(long_term_change, LONG_TERM_THRESHOLD),
        variability: calculate_variability(&values),
        time_in_range: calculate_time_in_range(&values),
    }
}

/// First occurrence wins on ties
fn first_extreme<F>(points: &[ForecastPoint], better: F) -> Extreme
where
    F: Fn(f64, f64) -> bool,
{
    let mut iter = points.iter();
    let Some(first) = iter.next() else {
        return Extreme { value: 0.0, hour: 0 };
    };

    iter.fold(
        Extreme {
            value: first.glucose,
            hour: first.hour,
        },
        |best, p| {
            if better(p.glucose, best.value) {
                Extreme {
                    value: p.glucose,
                    hour: p.hour,
                }
            } else {
                best
            }
        },
    )
}

/// Population standard deviation, rounded to whole mg/dL
pub fn calculate_variability(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt().round()
}

/// Rounded percentage of values in [70, 180]
pub fn calculate_time_in_range(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let in_range = values
        .iter()
        .filter(|&&g| (TARGET_LOW..=TARGET_HIGH).contains(&g))
        .count();
    (in_range as f64 / values.len() as f64 * 100.0).round()
}

/// Flag every hour outside the safe band
pub fn identify_risk_zones(points: &[ForecastPoint]) -> Vec<RiskZone> {
    points
        .iter()
        .filter_map(|p| {
            let (kind, severity) = if p.glucose < TARGET_LOW {
                let severity = if p.glucose < HYPO_SEVERE {
                    RiskSeverity::Severe
                } else {
                    RiskSeverity::Moderate
                };
                (RiskKind::Hypoglycemia, severity)
            } else if p.glucose > HYPER {
                let severity = if p.glucose > HYPER_SEVERE {
                    RiskSeverity::Severe
                } else {
                    RiskSeverity::Moderate
                };
                (RiskKind::Hyperglycemia, severity)
            } else if p.glucose > TARGET_HIGH {
                (RiskKind::Elevated, RiskSeverity::Mild)
            } else {
                return None;
            };

            Some(RiskZone {
                hour: p.hour,
                kind,
                severity,
                duration_hours: 1,
            })
        })
        .collect()
}

/// Rule-based advice from trends and risk zones
pub fn generate_recommendations(
    trends: &TrendSummary,
    risk_zones: &[RiskZone],
) -> Vec<PredictionRecommendation> {
    let mut recommendations = Vec::new();

    if let Some(hypo) = risk_zones.iter().find(|r| r.kind == RiskKind::Hypoglycemia) {
        recommendations.push(PredictionRecommendation {
            kind: RecommendationKind::Safety,
            priority: Priority::High,
            title: "Hypoglycemia Risk Detected".into(),
            message: format!(
                "Predicted low glucose at hour {} of the forecast. Have fast-acting carbs ready.",
                hypo.hour
            ),
            action: "Consider reducing insulin dose or having a snack beforehand.".into(),
        });
    }

    if let Some(hyper) = risk_zones.iter().find(|r| r.kind == RiskKind::Hyperglycemia) {
        recommendations.push(PredictionRecommendation {
            kind: RecommendationKind::Safety,
            priority: Priority::High,
            title: "Hyperglycemia Risk Detected".into(),
            message: format!(
                "Predicted high glucose at hour {} of the forecast.",
                hyper.hour
            ),
            action: "Consider additional insulin or reducing carb intake.".into(),
        });
    }

    if trends.time_in_range < TIME_IN_RANGE_GOAL {
        recommendations.push(PredictionRecommendation {
            kind: RecommendationKind::Optimization,
            priority: Priority::Medium,
            title: "Improve Time in Range".into(),
            message: format!(
                "Only {}% of predictions are in target range.",
                trends.time_in_range
            ),
            action: "Adjust meal timing or insulin doses for better control.".into(),
        });
    }

    if trends.peak.value > PEAK_ACTIVITY_TRIGGER {
        recommendations.push(PredictionRecommendation {
            kind: RecommendationKind::Lifestyle,
            priority: Priority::Medium,
            title: "Activity Suggestion".into(),
            message: "Light activity after meals could help reduce glucose peaks.".into(),
            action: "Consider a 15-minute walk after eating.".into(),
        });
    }

    recommendations
}

/// Confidence from data completeness and clinical risk factors
///
/// Rounded to two decimals and clamped to [0.5, 0.95].
pub fn calculate_confidence(profile: &UserProfile) -> f64 {
    let mut confidence = 0.85;

    if profile.hba1c.is_some_and(|h| h > 0.0) {
        confidence += 0.05;
    }
    if profile.weight_kg > 0.0 && profile.height_cm > 0 {
        confidence += 0.03;
    }
    // Activity is a required profile field
    confidence += 0.02;

    if profile.diabetes_type == DiabetesType::Type1 {
        confidence -= 0.05;
    }
    if profile.age > 65 {
        confidence -= 0.03;
    }

    ((confidence * 100.0_f64).round() / 100.0).clamp(0.5, 0.95)
}
