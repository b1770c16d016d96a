//! Synthetic training data built from hand-authored lighting heuristics.
//!
//! Every hour of the day is sampled `scenarios_per_hour` times with jittered
//! traffic, random weather and derived pedestrian/ambient/visibility values.
//! The brightness label follows a piecewise rule: off in full daylight, a
//! blended ramp around dawn and dusk, and a traffic/weather driven level at
//! night that rises towards midnight.

use crate::brightness::features::{FeatureVector, RawReading, encode};
use rand::Rng;

pub const HOURS_PER_DAY: usize = 24;
pub const DEFAULT_SCENARIOS_PER_HOUR: usize = 100;

/// Typical traffic density (0-100) for each hour, with morning and evening peaks.
pub const BASE_TRAFFIC: [f64; HOURS_PER_DAY] = [
    5.0, 3.0, 2.0, 2.0, 3.0, 8.0, // 00-05
    25.0, 55.0, 75.0, 60.0, 45.0, 50.0, // 06-11
    55.0, 50.0, 48.0, 52.0, 58.0, 70.0, // 12-17
    80.0, 65.0, 40.0, 25.0, 15.0, 8.0, // 18-23
];

const TRAFFIC_JITTER: f64 = 10.0;
const LOW_VISIBILITY_WEATHER: f64 = 70.0;
const VISIBILITY_PENALTY_BELOW: f64 = 300.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSample {
    pub reading: RawReading,
    pub features: FeatureVector,
    pub target: f64,
}

impl TrainingSample {
    pub fn new(reading: RawReading, target: f64) -> Self {
        Self {
            features: encode(&reading),
            reading,
            target,
        }
    }
}

/// Base traffic for an hour of the day; hours wrap modulo 24.
pub fn base_traffic(hour: usize) -> f64 {
    BASE_TRAFFIC[hour % HOURS_PER_DAY]
}

/// Base traffic scaled by a city factor.
pub fn traffic_for_hour(hour: usize, city_factor: f64) -> f64 {
    base_traffic(hour) * city_factor
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayPhase {
    Day,
    EarlyMorning,
    Dusk,
    Night,
}

#[derive(Debug, Clone, Copy)]
struct HourClass {
    daytime: bool,
    early_morning: bool,
    dusk: bool,
}

impl HourClass {
    fn of(hour: usize) -> Self {
        Self {
            daytime: (6..19).contains(&hour),
            early_morning: (5..7).contains(&hour),
            dusk: (18..20).contains(&hour),
        }
    }

    /// Ambient light follows this precedence: daytime wins over transitions.
    fn ambient_phase(self) -> DayPhase {
        if self.daytime {
            DayPhase::Day
        } else if self.early_morning {
            DayPhase::EarlyMorning
        } else if self.dusk {
            DayPhase::Dusk
        } else {
            DayPhase::Night
        }
    }

    /// Labels use a narrower full-daylight window than ambient light.
    fn target_phase(self, hour: usize) -> DayPhase {
        if self.daytime && hour > 7 && hour < 18 {
            DayPhase::Day
        } else if self.dusk {
            DayPhase::Dusk
        } else if self.early_morning {
            DayPhase::EarlyMorning
        } else {
            DayPhase::Night
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrainingDataSynthesizer {
    pub scenarios_per_hour: usize,
}

impl Default for TrainingDataSynthesizer {
    fn default() -> Self {
        Self {
            scenarios_per_hour: DEFAULT_SCENARIOS_PER_HOUR,
        }
    }
}

impl TrainingDataSynthesizer {
    pub fn new(scenarios_per_hour: usize) -> Self {
        Self { scenarios_per_hour }
    }

    pub fn generate<R: Rng>(&self, rng: &mut R) -> Vec<TrainingSample> {
        let mut samples = Vec::with_capacity(HOURS_PER_DAY * self.scenarios_per_hour);
        for hour in 0..HOURS_PER_DAY {
            for _ in 0..self.scenarios_per_hour {
                samples.push(synthesize_sample(hour, rng));
            }
        }
        samples
    }
}

fn synthesize_sample<R: Rng>(hour: usize, rng: &mut R) -> TrainingSample {
    let class = HourClass::of(hour);

    let traffic_density = (base_traffic(hour) + rng.gen_range(-TRAFFIC_JITTER..TRAFFIC_JITTER))
        .clamp(0.0, 100.0);
    let weather_severity = rng.gen_range(0.0..100.0);
    let pedestrian_count = traffic_density * 0.6 * if class.daytime { 1.5 } else { 0.3 };

    let ambient_light = match class.ambient_phase() {
        DayPhase::Day => rng.gen_range(500.0..1000.0),
        DayPhase::EarlyMorning | DayPhase::Dusk => rng.gen_range(100.0..300.0),
        DayPhase::Night => rng.gen_range(0.0..50.0),
    };

    let temperature = rng.gen_range(15.0..35.0);
    let humidity = rng.gen_range(40.0..90.0);
    let visibility = if weather_severity > LOW_VISIBILITY_WEATHER {
        rng.gen_range(100.0..500.0)
    } else {
        rng.gen_range(400.0..1000.0)
    };

    let reading = RawReading {
        time_of_day: hour as f64,
        traffic_density,
        weather_severity,
        pedestrian_count,
        ambient_light,
        temperature,
        humidity,
        visibility,
    };

    TrainingSample::new(reading, target_brightness(hour, &reading))
}

/// Ground-truth label the ensemble learns to approximate.
pub fn target_brightness(hour: usize, reading: &RawReading) -> f64 {
    let traffic = reading.traffic_density / 100.0;
    let weather = reading.weather_severity / 100.0;
    let hour_f = hour as f64;

    match HourClass::of(hour).target_phase(hour) {
        DayPhase::Day => 0.0,
        phase @ (DayPhase::EarlyMorning | DayPhase::Dusk) => {
            let transition = if phase == DayPhase::Dusk {
                (hour_f - 18.0) / 2.0
            } else {
                (7.0 - hour_f) / 2.0
            };
            (0.15 + transition * 0.3 + traffic * 0.5 + weather * 0.25).min(1.0)
        }
        DayPhase::Night => {
            let hours_from_midnight = if hour > 12 { 24.0 - hour_f } else { hour_f };
            let night_depth = ((6.0 - hours_from_midnight) / 6.0).max(0.0);
            let visibility_penalty = if reading.visibility < VISIBILITY_PENALTY_BELOW {
                0.15
            } else {
                0.0
            };

            (0.2 + night_depth * 0.1
                + traffic * 0.45
                + weather * 0.2
                + visibility_penalty
                + (reading.pedestrian_count / 100.0) * 0.1)
                .min(1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn generate(seed: u64, scenarios: usize) -> Vec<TrainingSample> {
        let mut rng = StdRng::seed_from_u64(seed);
        TrainingDataSynthesizer::new(scenarios).generate(&mut rng)
    }

    fn night_reading(visibility: f64) -> RawReading {
        RawReading {
            time_of_day: 0.0,
            traffic_density: 0.0,
            weather_severity: 0.0,
            pedestrian_count: 0.0,
            ambient_light: 10.0,
            temperature: 20.0,
            humidity: 60.0,
            visibility,
        }
    }

    #[test]
    fn generates_one_sample_per_hour_and_scenario() {
        let samples = generate(7, 10);

        assert_eq!(samples.len(), HOURS_PER_DAY * 10);
        for (hour, chunk) in samples.chunks(10).enumerate() {
            assert!(chunk.iter().all(|s| s.reading.time_of_day == hour as f64));
        }
    }

    #[test]
    fn same_seed_yields_identical_dataset() {
        assert_eq!(generate(42, 5), generate(42, 5));
    }

    #[test]
    fn generated_values_stay_in_documented_ranges() {
        for sample in generate(3, 20) {
            let r = sample.reading;
            assert!((0.0..=100.0).contains(&r.traffic_density));
            assert!((0.0..100.0).contains(&r.weather_severity));
            assert!(r.pedestrian_count >= 0.0);
            assert!((15.0..35.0).contains(&r.temperature));
            assert!((40.0..90.0).contains(&r.humidity));
            if r.weather_severity > 70.0 {
                assert!((100.0..500.0).contains(&r.visibility));
            } else {
                assert!((400.0..1000.0).contains(&r.visibility));
            }
            assert!((0.0..=1.0).contains(&sample.target));
            assert_eq!(sample.features, encode(&r));
        }
    }

    #[test]
    fn ambient_light_tracks_day_phase() {
        for sample in generate(11, 20) {
            let hour = sample.reading.time_of_day as usize;
            let ambient = sample.reading.ambient_light;
            match hour {
                6..=18 => assert!((500.0..1000.0).contains(&ambient)),
                5 | 19 => assert!((100.0..300.0).contains(&ambient)),
                _ => assert!((0.0..50.0).contains(&ambient)),
            }
        }
    }

    #[test]
    fn full_daylight_hours_are_labelled_off() {
        for sample in generate(5, 20) {
            let hour = sample.reading.time_of_day as usize;
            if (8..18).contains(&hour) {
                assert_eq!(sample.target, 0.0);
            } else {
                assert!(sample.target >= 0.15, "hour {hour} target {}", sample.target);
            }
        }
    }

    #[test]
    fn night_level_rises_towards_midnight() {
        let midnight = target_brightness(0, &night_reading(800.0));
        let late_evening = target_brightness(21, &night_reading(800.0));
        let early_night = target_brightness(4, &night_reading(800.0));

        assert!((midnight - 0.3).abs() < 1e-12);
        assert!((late_evening - 0.25).abs() < 1e-12);
        assert!(midnight > early_night);
    }

    #[test]
    fn poor_visibility_adds_a_night_penalty() {
        let clear = target_brightness(23, &night_reading(800.0));
        let foggy = target_brightness(23, &night_reading(150.0));

        assert!((foggy - clear - 0.15).abs() < 1e-12);
    }

    #[test]
    fn transition_hours_blend_floor_and_boosts() {
        let mut reading = night_reading(800.0);
        reading.traffic_density = 40.0;
        reading.weather_severity = 20.0;

        // 0.15 + 0.5 * 0.3 + 0.4 * 0.5 + 0.2 * 0.25
        assert!((target_brightness(19, &reading) - 0.55).abs() < 1e-12);
        // 0.15 + 1.0 * 0.3 + 0.4 * 0.5 + 0.2 * 0.25
        assert!((target_brightness(5, &reading) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn targets_are_capped_at_full_brightness() {
        let mut reading = night_reading(100.0);
        reading.traffic_density = 100.0;
        reading.weather_severity = 100.0;
        reading.pedestrian_count = 100.0;

        assert_eq!(target_brightness(0, &reading), 1.0);
        assert_eq!(target_brightness(5, &reading), 1.0);
    }

    #[test]
    fn traffic_for_hour_scales_base_curve() {
        assert_eq!(traffic_for_hour(8, 1.0), 75.0);
        assert_eq!(traffic_for_hour(18, 0.5), 40.0);
        assert_eq!(base_traffic(24), base_traffic(0));
    }
}
