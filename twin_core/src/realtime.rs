//! Simulated real-time glucose readings for periodic refresh.
//!
//! Independent of the 24-hour forecast: it neither reads nor updates
//! forecast state.

use crate::noise::NoiseSource;
use crate::{Trend, UserProfile};
use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

const FALLBACK_BASELINE: f64 = 120.0;
const READING_CONFIDENCE: f64 = 0.85;

/// A single synthesized reading
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RealTimeReading {
    pub glucose: f64,
    pub timestamp: DateTime<Utc>,
    pub trend: Trend,
    pub confidence: f64,
}

/// Synthesize one reading from the profile baseline at `now`
///
/// Uses the wall-clock hour of `now` in its own timezone.
pub fn simulate_real_time_data<Tz, N>(
    profile: &UserProfile,
    now: &DateTime<Tz>,
    noise: &mut N,
) -> RealTimeReading
where
    Tz: TimeZone,
    N: NoiseSource + ?Sized,
{
    let hour = now.hour();
    let mut glucose = if profile.current_bg > 0 {
        f64::from(profile.current_bg)
    } else {
        FALLBACK_BASELINE
    };

    glucose += match hour {
        4..=8 => 15.0,
        12..=14 => 10.0,
        0..=3 => -5.0,
        _ => 0.0,
    };

    glucose += noise.centered(20.0);

    let pseudo_trend = (f64::from(hour) * 0.2).sin() * 8.0;
    glucose += pseudo_trend;

    let glucose = glucose.clamp(70.0, 250.0).round();
    let trend = Trend::classify(pseudo_trend, 2.0);

    tracing::debug!(glucose, hour, %trend, "Simulated real-time reading");

    RealTimeReading {
        glucose,
        timestamp: now.with_timezone(&Utc),
        trend,
        confidence: READING_CONFIDENCE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{FixedNoise, RandomNoise};
    use crate::{ActivityLevel, DiabetesType};

    fn profile_with_bg(current_bg: u32) -> UserProfile {
        UserProfile {
            age: 35,
            weight_kg: 72.0,
            height_cm: 170,
            diabetes_type: DiabetesType::Type1,
            activity: ActivityLevel::Light,
            hba1c: Some(7.1),
            current_bg,
            sleep_hours: None,
            stress_level: None,
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_dawn_reading_rises() {
        let reading =
            simulate_real_time_data(&profile_with_bg(100), &at(6), &mut FixedNoise::silent());

        // 100 + 15 dawn + sin(1.2) * 8
        assert_eq!(reading.glucose, 122.0);
        assert_eq!(reading.trend, Trend::Rising);
        assert_eq!(reading.confidence, 0.85);
        assert_eq!(reading.timestamp, at(6));
    }

    #[test]
    fn test_evening_reading_falls() {
        let reading =
            simulate_real_time_data(&profile_with_bg(100), &at(20), &mut FixedNoise::silent());

        // sin(4.0) * 8 is about -6
        assert_eq!(reading.glucose, 94.0);
        assert_eq!(reading.trend, Trend::Falling);
    }

    #[test]
    fn test_small_pseudo_trend_is_stable() {
        let reading =
            simulate_real_time_data(&profile_with_bg(100), &at(16), &mut FixedNoise::silent());
        assert_eq!(reading.trend, Trend::Stable);
    }

    #[test]
    fn test_missing_baseline_uses_fallback() {
        let reading =
            simulate_real_time_data(&profile_with_bg(0), &at(10), &mut FixedNoise::silent());
        // 120 + sin(2.0) * 8
        assert_eq!(reading.glucose, 127.0);
    }

    #[test]
    fn test_readings_are_clamped() {
        let mut noise = RandomNoise::seeded(3);
        for hour in 0..24 {
            let high = simulate_real_time_data(&profile_with_bg(500), &at(hour), &mut noise);
            assert_eq!(high.glucose, 250.0);
            let low = simulate_real_time_data(&profile_with_bg(30), &at(hour), &mut noise);
            assert_eq!(low.glucose, 70.0);
        }
    }
}
