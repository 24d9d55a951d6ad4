//! 24-hour glucose forecast composer.
//!
//! The forecast is built in layers:
//! - A stateful base fold (carb impulse, insulin impulse, natural drift, variation)
//! - Activity, circadian and lifestyle passes that add deltas per hour
//! - A personalization pass that scales the already-adjusted value
//! - Biological noise with a final clamp
//!
//! Pass order matters. Personalization multiplies the value produced by the
//! additive passes, so circadian and lifestyle offsets are scaled too.

use crate::analysis;
use crate::noise::NoiseSource;
use crate::{
    ActivityLevel, DiabetesType, FactorBreakdown, Forecast, ForecastPoint, UserProfile,
};
use chrono::{Local, Timelike, Utc};
use std::f64::consts::PI;
use uuid::Uuid;

pub const FORECAST_HOURS: u32 = 24;

const CARB_WINDOW_HOURS: f64 = 4.0;
const INSULIN_WINDOW_HOURS: f64 = 6.0;
const CARB_EFFECT_PER_GRAM: f64 = 5.0;
const INSULIN_EFFECT_PER_UNIT: f64 = 50.0;
const DRIFT_SETPOINT: f64 = 100.0;
const DRIFT_RATE: f64 = 0.02;
const VARIATION_SPAN: f64 = 15.0;
const BASE_MIN: f64 = 50.0;
const BASE_MAX: f64 = 400.0;

const ACTIVITY_FLOOR: f64 = 60.0;
const NOISE_SPAN: f64 = 20.0;
const FINAL_MIN: f64 = 60.0;
const FINAL_MAX: f64 = 400.0;

/// Current state and planned actions for a forecast
#[derive(Clone, Debug, PartialEq)]
pub struct PredictionInput {
    pub current_glucose: f64,
    pub planned_carbs: f64,
    pub planned_insulin: f64,
    pub planned_activity: ActivityLevel,
    /// Wall-clock hour the forecast starts at (0-23)
    pub hour_of_day: u32,
    /// Stress on a 0-10 scale
    pub stress_level: f64,
    pub sleep_hours: f64,
}

impl PredictionInput {
    /// Defaults starting at a given wall-clock hour
    pub fn at_hour(current_glucose: f64, hour_of_day: u32) -> Self {
        Self {
            current_glucose,
            planned_carbs: 0.0,
            planned_insulin: 0.0,
            planned_activity: ActivityLevel::Sedentary,
            hour_of_day: hour_of_day % 24,
            stress_level: 5.0,
            sleep_hours: 7.0,
        }
    }

    /// Defaults starting at the current local hour
    pub fn now(current_glucose: f64) -> Self {
        Self::at_hour(current_glucose, Local::now().hour())
    }
}

impl Default for PredictionInput {
    fn default() -> Self {
        Self::now(100.0)
    }
}

/// Produce a 24-hour forecast with trend, risk and recommendation summaries
///
/// Not idempotent: two calls with the same inputs differ unless `noise` is
/// a fixed or identically-seeded source.
pub fn predict_glucose<N: NoiseSource + ?Sized>(
    profile: &UserProfile,
    input: &PredictionInput,
    noise: &mut N,
) -> Forecast {
    let start_hour = input.hour_of_day % 24;
    let mut points = base_curve(
        input.current_glucose,
        input.planned_carbs,
        input.planned_insulin,
        noise,
    );

    apply_activity(&mut points, input.planned_activity);
    apply_circadian_rhythm(&mut points, start_hour);
    apply_lifestyle(&mut points, input.stress_level, input.sleep_hours);
    apply_personalization(&mut points, profile);
    apply_biological_noise(&mut points, noise);

    let trends = analysis::analyze_trends(&points);
    let risk_zones = analysis::identify_risk_zones(&points);
    let recommendations = analysis::generate_recommendations(&trends, &risk_zones);
    let confidence = analysis::calculate_confidence(profile);

    tracing::debug!(
        peak = trends.peak.value,
        nadir = trends.nadir.value,
        time_in_range = trends.time_in_range,
        risk_zones = risk_zones.len(),
        "Forecast composed"
    );

    Forecast {
        id: Uuid::new_v4(),
        generated_at: Utc::now(),
        start_hour,
        points,
        confidence,
        trends,
        risk_zones,
        recommendations,
    }
}

/// Stateful fold producing the base curve
///
/// The running value carries forward hour to hour and is clamped after each
/// step. Reported glucose is rounded; the carried value is not.
pub(crate) fn base_curve<N: NoiseSource + ?Sized>(
    current_glucose: f64,
    planned_carbs: f64,
    planned_insulin: f64,
    noise: &mut N,
) -> Vec<ForecastPoint> {
    let mut current = current_glucose;

    (0..FORECAST_HOURS)
        .map(|hour| {
            let h = f64::from(hour);

            let carb = if h < CARB_WINDOW_HOURS {
                let curve = (h / CARB_WINDOW_HOURS * PI).sin();
                planned_carbs * CARB_EFFECT_PER_GRAM * curve * 0.25
            } else {
                0.0
            };

            let insulin = if h < INSULIN_WINDOW_HOURS {
                let curve = (h / INSULIN_WINDOW_HOURS * PI).sin().max(0.0).powf(0.8);
                planned_insulin * INSULIN_EFFECT_PER_UNIT * curve * 0.3
            } else {
                0.0
            };

            let drift = natural_drift(current, hour);
            current += carb - insulin + drift;

            let variation = noise.centered(VARIATION_SPAN);
            current += variation;
            current = current.clamp(BASE_MIN, BASE_MAX);

            ForecastPoint {
                hour,
                glucose: current.round(),
                factors: FactorBreakdown {
                    carb: carb.round(),
                    insulin: insulin.round(),
                    drift: drift.round(),
                    variation: variation.round(),
                    ..FactorBreakdown::default()
                },
            }
        })
        .collect()
}

/// Basal regulation toward the setpoint, with dawn and afternoon offsets
///
/// `hour` is the forecast offset, not the wall-clock hour.
fn natural_drift(current: f64, hour: u32) -> f64 {
    let base = (DRIFT_SETPOINT - current) * DRIFT_RATE;
    match hour {
        4..=8 => base + 8.0,
        14..=16 => base - 5.0,
        _ => base,
    }
}

/// Peak effect (mg/dL) and duration (hours) of an activity level
pub fn activity_impact(level: ActivityLevel) -> (f64, u32) {
    match level {
        ActivityLevel::Sedentary => (0.0, 0),
        ActivityLevel::Light => (-15.0, 2),
        ActivityLevel::Moderate => (-30.0, 4),
        ActivityLevel::Active => (-50.0, 6),
        ActivityLevel::Athlete => (-40.0, 8),
    }
}

fn apply_activity(points: &mut [ForecastPoint], level: ActivityLevel) {
    let (effect, duration) = activity_impact(level);
    if duration == 0 {
        return;
    }

    for point in points.iter_mut().filter(|p| p.hour <= duration) {
        let progress = f64::from(point.hour) / f64::from(duration);
        let delta = effect * (1.0 - progress);
        point.glucose = (point.glucose + delta).max(ACTIVITY_FLOOR);
        point.factors.activity = Some(delta.round());
    }
}

/// Time-of-day offset for a wall-clock hour
pub fn circadian_offset(clock_hour: u32) -> f64 {
    match clock_hour % 24 {
        h @ 4..=8 => 8.0 + f64::from(h - 4) * 2.0,
        12..=14 => 5.0,
        17..=19 => 3.0,
        0..=3 => -2.0,
        _ => 0.0,
    }
}

fn apply_circadian_rhythm(points: &mut [ForecastPoint], start_hour: u32) {
    for point in points.iter_mut() {
        let offset = circadian_offset(start_hour + point.hour);
        point.glucose += offset;
        point.factors.circadian = offset;
    }
}

fn apply_lifestyle(points: &mut [ForecastPoint], stress_level: f64, sleep_hours: f64) {
    let stress = (stress_level - 5.0) * 2.0;
    let sleep = (7.0 - sleep_hours) * 3.0;

    for point in points.iter_mut() {
        point.glucose += stress + sleep;
        point.factors.stress = stress.round();
        point.factors.sleep = sleep.round();
    }
}

/// Diabetes-type multiplier scaled by weight relative to 70 kg
pub fn personal_multiplier(profile: &UserProfile) -> f64 {
    let type_multiplier = match profile.diabetes_type {
        DiabetesType::Type1 => 0.9,
        DiabetesType::Type2 => 1.2,
        DiabetesType::Prediabetes => 1.0,
    };
    type_multiplier * (profile.weight_kg / 70.0)
}

fn apply_personalization(points: &mut [ForecastPoint], profile: &UserProfile) {
    let multiplier = personal_multiplier(profile);

    for point in points.iter_mut() {
        point.factors.personalization = (point.glucose * (multiplier - 1.0)).round();
        point.glucose = (point.glucose * multiplier).round();
    }
}

fn apply_biological_noise<N: NoiseSource + ?Sized>(points: &mut [ForecastPoint], noise: &mut N) {
    for point in points.iter_mut() {
        let delta = noise.centered(NOISE_SPAN);
        point.glucose = (point.glucose + delta).clamp(FINAL_MIN, FINAL_MAX);
        point.factors.noise = delta.round();
    }
}
