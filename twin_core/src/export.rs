//! CSV export of forecast points.

use crate::{Forecast, ForecastPoint, Result};
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    hour: u32,
    clock_hour: u32,
    glucose: f64,
    carb: f64,
    insulin: f64,
    drift: f64,
    variation: f64,
    activity: Option<f64>,
    circadian: f64,
    stress: f64,
    sleep: f64,
    personalization: f64,
    noise: f64,
}

impl CsvRow {
    fn new(point: &ForecastPoint, start_hour: u32) -> Self {
        let f = &point.factors;
        CsvRow {
            hour: point.hour,
            clock_hour: (start_hour + point.hour) % 24,
            glucose: point.glucose,
            carb: f.carb,
            insulin: f.insulin,
            drift: f.drift,
            variation: f.variation,
            activity: f.activity,
            circadian: f.circadian,
            stress: f.stress,
            sleep: f.sleep,
            personalization: f.personalization,
            noise: f.noise,
        }
    }
}

/// Write one row per forecast hour, with headers, and sync to disk
///
/// Overwrites `path`. Returns the number of rows written.
pub fn write_forecast_csv(forecast: &Forecast, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(file);

    for point in &forecast.points {
        writer.serialize(CsvRow::new(point, forecast.start_hour))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!(
        "Exported forecast {} ({} rows) to {:?}",
        forecast.id,
        forecast.points.len(),
        path
    );
    Ok(forecast.points.len())
}
