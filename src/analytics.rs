//! Energy analytics derived from predicted brightness.
//!
//! A conventional installation runs every light at full power around the
//! clock; the smart installation draws power proportional to the predicted
//! brightness for each hour. Savings, cost and CO2 follow from the difference.

use crate::brightness::PredictionService;
use crate::brightness::features::BrightnessQuery;
use crate::brightness::importance::FeatureImportance;
use crate::brightness::synth::{HOURS_PER_DAY, traffic_for_hour};
use crate::brightness::ModelMetrics;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

pub const TOTAL_LIGHTS: f64 = 50.0;
/// kWh drawn by one LED streetlight at full brightness for an hour.
pub const ENERGY_PER_LIGHT_HOUR_KWH: f64 = 0.15;
pub const COST_PER_KWH: f64 = 0.12;
pub const CO2_KG_PER_KWH: f64 = 0.4;
pub const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitySize {
    Small,
    #[default]
    Medium,
    Large,
}

impl CitySize {
    /// Multiplier applied to the base hourly traffic curve.
    pub fn traffic_factor(self) -> f64 {
        match self {
            CitySize::Small => 1.0,
            CitySize::Medium => 1.1,
            CitySize::Large => 1.2,
        }
    }
}

/// Parameters chosen in the dashboard controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub traffic: f64,
    pub weather: f64,
    #[serde(default)]
    pub city: CitySize,
    pub time: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            traffic: 30.0,
            weather: 10.0,
            city: CitySize::Medium,
            time: 22.0,
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> Result<(), AppError> {
        check_range("traffic", self.traffic, 0.0, 100.0, "0-100")?;
        check_range("weather", self.weather, 0.0, 100.0, "0-100")?;
        check_range("time", self.time, 0.0, 23.0, "0-23")?;
        Ok(())
    }

    pub fn query(&self) -> BrightnessQuery {
        BrightnessQuery::new(self.time, self.traffic, self.weather)
    }
}

fn check_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
    expected: &'static str,
) -> Result<(), AppError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(AppError::InvalidParams {
            field,
            value,
            expected,
        })
    }
}

/// Brightness and consumption for each hour of a typical day.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyProfile {
    pub brightness: Vec<f64>,
    pub consumption_kwh: Vec<f64>,
}

/// Predict every hour of the day using the city's traffic curve and the
/// selected weather.
pub fn hourly_profile(service: &PredictionService, params: &SimulationParams) -> HourlyProfile {
    let brightness: Vec<f64> = (0..HOURS_PER_DAY)
        .map(|hour| {
            let traffic = traffic_for_hour(hour, params.city.traffic_factor()).clamp(0.0, 100.0);
            service.predict(&BrightnessQuery::new(hour as f64, traffic, params.weather))
        })
        .collect();
    let consumption_kwh = brightness.iter().map(|&b| hourly_consumption_kwh(b)).collect();

    HourlyProfile {
        brightness,
        consumption_kwh,
    }
}

pub fn hourly_consumption_kwh(brightness: f64) -> f64 {
    TOTAL_LIGHTS * ENERGY_PER_LIGHT_HOUR_KWH * brightness
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyReport {
    pub conventional_kwh: f64,
    pub smart_kwh: f64,
    pub energy_saved_kwh: f64,
    pub cost_saved: f64,
    pub co2_reduced_kg: f64,
    pub load_decrease_percent: f64,
}

impl EnergyReport {
    /// Daily report from per-hour smart consumption.
    pub fn from_consumption(hourly_kwh: &[f64]) -> Self {
        let conventional_kwh = TOTAL_LIGHTS * ENERGY_PER_LIGHT_HOUR_KWH * HOURS_PER_DAY as f64;
        let smart_kwh: f64 = hourly_kwh.iter().sum();
        let energy_saved_kwh = conventional_kwh - smart_kwh;

        Self {
            conventional_kwh,
            smart_kwh,
            energy_saved_kwh,
            cost_saved: energy_saved_kwh * COST_PER_KWH,
            co2_reduced_kg: energy_saved_kwh * CO2_KG_PER_KWH,
            load_decrease_percent: energy_saved_kwh / conventional_kwh * 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearlyProjection {
    pub energy_saved_kwh: f64,
    pub cost_saved: f64,
    pub co2_reduced_kg: f64,
    pub load_decrease_percent: f64,
}

impl From<&EnergyReport> for YearlyProjection {
    fn from(daily: &EnergyReport) -> Self {
        Self {
            energy_saved_kwh: daily.energy_saved_kwh * DAYS_PER_YEAR,
            cost_saved: daily.cost_saved * DAYS_PER_YEAR,
            co2_reduced_kg: daily.co2_reduced_kg * DAYS_PER_YEAR,
            load_decrease_percent: daily.load_decrease_percent,
        }
    }
}

/// Everything the dashboard shows for one parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct LightingSnapshot {
    pub params: SimulationParams,
    pub predicted_brightness: f64,
    pub model: &'static str,
    pub hourly: HourlyProfile,
    pub energy: EnergyReport,
    pub yearly: YearlyProjection,
    pub metrics: ModelMetrics,
    pub feature_importance: FeatureImportance,
    pub timestamp: SystemTime,
}

impl LightingSnapshot {
    pub fn build(
        service: &PredictionService,
        params: SimulationParams,
        timestamp: SystemTime,
    ) -> Self {
        let hourly = hourly_profile(service, &params);
        let energy = EnergyReport::from_consumption(&hourly.consumption_kwh);

        Self {
            params,
            predicted_brightness: service.predict(&params.query()),
            model: service.active_model().name(),
            yearly: YearlyProjection::from(&energy),
            hourly,
            energy,
            metrics: service.model_metrics(),
            feature_importance: service.feature_importance(),
            timestamp,
        }
    }
}
