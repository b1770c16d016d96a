//! Raw sensor/environment readings and their normalized feature vectors.
//!
//! The same [`encode`] is used for training samples and runtime queries, so
//! both sides of the model always see identically scaled inputs.

use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 8;

pub const TIME_OF_DAY: usize = 0;
pub const TRAFFIC_DENSITY: usize = 1;
pub const WEATHER_SEVERITY: usize = 2;
pub const PEDESTRIAN_COUNT: usize = 3;
pub const AMBIENT_LIGHT: usize = 4;
pub const TEMPERATURE: usize = 5;
pub const HUMIDITY: usize = 6;
pub const VISIBILITY: usize = 7;

/// Divisor applied to each raw field, in feature index order.
pub const FEATURE_SCALES: [f64; FEATURE_COUNT] =
    [24.0, 100.0, 100.0, 60.0, 1000.0, 40.0, 100.0, 1000.0];

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "time_of_day",
    "traffic_density",
    "weather_severity",
    "pedestrian_count",
    "ambient_light",
    "temperature",
    "humidity",
    "visibility",
];

pub const DEFAULT_PEDESTRIAN_COUNT: f64 = 10.0;
pub const DEFAULT_DAY_AMBIENT_LIGHT: f64 = 800.0;
pub const DEFAULT_NIGHT_AMBIENT_LIGHT: f64 = 10.0;
pub const DEFAULT_TEMPERATURE: f64 = 20.0;
pub const DEFAULT_HUMIDITY: f64 = 60.0;
pub const DEFAULT_VISIBILITY: f64 = 500.0;

pub type FeatureVector = [f64; FEATURE_COUNT];

/// Hours in `[6, 19)` count as daytime for defaults and the fallback model.
pub fn is_daytime(time_of_day: f64) -> bool {
    (6.0..19.0).contains(&time_of_day)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    pub time_of_day: f64,
    pub traffic_density: f64,
    pub weather_severity: f64,
    pub pedestrian_count: f64,
    pub ambient_light: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub visibility: f64,
}

/// Runtime query. Only time, traffic and weather are mandatory; the rest fall
/// back to documented defaults when absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BrightnessQuery {
    pub time_of_day: f64,
    pub traffic_density: f64,
    pub weather_severity: f64,
    #[serde(default)]
    pub pedestrian_count: Option<f64>,
    #[serde(default)]
    pub ambient_light: Option<f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub visibility: Option<f64>,
}

impl BrightnessQuery {
    pub fn new(time_of_day: f64, traffic_density: f64, weather_severity: f64) -> Self {
        Self {
            time_of_day,
            traffic_density,
            weather_severity,
            ..Self::default()
        }
    }

    pub fn reading(&self) -> RawReading {
        let default_ambient = if is_daytime(self.time_of_day) {
            DEFAULT_DAY_AMBIENT_LIGHT
        } else {
            DEFAULT_NIGHT_AMBIENT_LIGHT
        };

        RawReading {
            time_of_day: self.time_of_day,
            traffic_density: self.traffic_density,
            weather_severity: self.weather_severity,
            pedestrian_count: self.pedestrian_count.unwrap_or(DEFAULT_PEDESTRIAN_COUNT),
            ambient_light: self.ambient_light.unwrap_or(default_ambient),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            humidity: self.humidity.unwrap_or(DEFAULT_HUMIDITY),
            visibility: self.visibility.unwrap_or(DEFAULT_VISIBILITY),
        }
    }
}

impl From<RawReading> for BrightnessQuery {
    fn from(reading: RawReading) -> Self {
        Self {
            time_of_day: reading.time_of_day,
            traffic_density: reading.traffic_density,
            weather_severity: reading.weather_severity,
            pedestrian_count: Some(reading.pedestrian_count),
            ambient_light: Some(reading.ambient_light),
            temperature: Some(reading.temperature),
            humidity: Some(reading.humidity),
            visibility: Some(reading.visibility),
        }
    }
}

pub fn encode(reading: &RawReading) -> FeatureVector {
    let raw = [
        reading.time_of_day,
        reading.traffic_density,
        reading.weather_severity,
        reading.pedestrian_count,
        reading.ambient_light,
        reading.temperature,
        reading.humidity,
        reading.visibility,
    ];
    std::array::from_fn(|idx| raw[idx] / FEATURE_SCALES[idx])
}
