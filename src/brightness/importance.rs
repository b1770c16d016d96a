//! Split-count based feature importance, grouped into three semantic buckets.

use crate::brightness::features::{
    AMBIENT_LIGHT, HUMIDITY, PEDESTRIAN_COUNT, TIME_OF_DAY, TRAFFIC_DENSITY, VISIBILITY,
    WEATHER_SEVERITY,
};
use crate::brightness::tree::SplitCounts;
use serde::Serialize;

const TRAFFIC_FEATURES: [usize; 2] = [TRAFFIC_DENSITY, PEDESTRIAN_COUNT];
const WEATHER_FEATURES: [usize; 3] = [WEATHER_SEVERITY, HUMIDITY, VISIBILITY];
const TIME_FEATURES: [usize; 2] = [TIME_OF_DAY, AMBIENT_LIGHT];

/// Percentages summing to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FeatureImportance {
    pub traffic: f64,
    pub weather: f64,
    pub time_of_day: f64,
}

impl Default for FeatureImportance {
    fn default() -> Self {
        Self {
            traffic: 45.0,
            weather: 30.0,
            time_of_day: 25.0,
        }
    }
}

impl FeatureImportance {
    /// Falls back to the default split when no split landed in any bucket.
    pub fn from_split_counts(counts: &SplitCounts) -> Self {
        let total: usize = counts.iter().sum();
        if total == 0 {
            return Self::default();
        }

        let percent = |idx: usize| counts[idx] as f64 / total as f64 * 100.0;
        let bucket = |features: &[usize]| features.iter().map(|&idx| percent(idx)).sum::<f64>();

        let traffic = bucket(&TRAFFIC_FEATURES);
        let weather = bucket(&WEATHER_FEATURES);
        let time_of_day = bucket(&TIME_FEATURES);

        let grouped = traffic + weather + time_of_day;
        if grouped <= 0.0 {
            return Self::default();
        }

        Self {
            traffic: traffic / grouped * 100.0,
            weather: weather / grouped * 100.0,
            time_of_day: time_of_day / grouped * 100.0,
        }
    }

    pub fn total(&self) -> f64 {
        self.traffic + self.weather + self.time_of_day
    }
}
