//! Closed-form heuristic used whenever the trained ensemble cannot answer.
//!
//! Formula: 0 during daytime, otherwise
//! `base + traffic_weight * traffic/100 + weather_weight * weather/100`,
//! clamped to `[0, 1]`.

use crate::brightness::PredictionError;
use crate::brightness::features::{RawReading, is_daytime};
use crate::brightness::model::BrightnessModel;

#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicParams {
    pub night_base: f64,
    pub traffic_weight: f64,
    pub weather_weight: f64,
}

impl Default for HeuristicParams {
    fn default() -> Self {
        Self {
            night_base: 0.25,
            traffic_weight: 0.45,
            weather_weight: 0.25,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeuristicModel {
    pub params: HeuristicParams,
}

impl HeuristicModel {
    /// Never fails and always lands in `[0, 1]`; non-finite inputs count as 0.
    pub fn brightness(&self, time_of_day: f64, traffic_density: f64, weather_severity: f64) -> f64 {
        if is_daytime(time_of_day) {
            return 0.0;
        }

        let traffic = finite_or_zero(traffic_density) / 100.0;
        let weather = finite_or_zero(weather_severity) / 100.0;
        let brightness = self.params.night_base
            + self.params.traffic_weight * traffic
            + self.params.weather_weight * weather;

        finite_or_zero(brightness).clamp(0.0, 1.0)
    }
}

impl BrightnessModel for HeuristicModel {
    fn predict_brightness(&self, reading: &RawReading) -> Result<f64, PredictionError> {
        Ok(self.brightness(
            reading.time_of_day,
            reading.traffic_density,
            reading.weather_severity,
        ))
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
