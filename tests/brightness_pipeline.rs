use lumen_flow::analytics::{CitySize, SimulationParams};
use lumen_flow::brightness::ensemble::BoostingParams;
use lumen_flow::brightness::features::BrightnessQuery;
use lumen_flow::brightness::synth::TrainingDataSynthesizer;
use lumen_flow::brightness::{PredictionService, TrainingSettings};
use lumen_flow::error::AppError;
use lumen_flow::state::AppState;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, RwLock};

fn seeded_settings() -> TrainingSettings {
    TrainingSettings {
        seed: Some(2024),
        ..TrainingSettings::default()
    }
}

#[test]
fn trained_service_lights_midnight() {
    let service = PredictionService::new(&seeded_settings());
    assert!(service.is_ready());
    assert_eq!(service.active_model().name(), "gradient_boosting");

    let midnight = service.predict(&BrightnessQuery::new(0.0, 30.0, 20.0));

    assert!(midnight > 0.2 && midnight <= 1.0, "midnight = {midnight}");
    let importance = service.feature_importance();
    assert!((importance.total() - 100.0).abs() < 1e-9);
}

#[test]
fn noon_with_defaulted_fields_is_not_dark() {
    // Only time, traffic and weather are given. The default pedestrian count
    // of 10 sits in the night range of the training data while traffic is
    // daytime-high, so trees route the query with dusk and night samples.
    for seed in [1, 2, 3] {
        let service = PredictionService::new(&TrainingSettings {
            seed: Some(seed),
            ..TrainingSettings::default()
        });

        let noon = service.predict(&BrightnessQuery::new(12.0, 90.0, 80.0));

        assert!((0.0..=1.0).contains(&noon), "seed {seed}: noon = {noon}");
        assert!(noon > 0.0, "seed {seed}: noon = {noon}");
    }
}

#[test]
fn same_seed_trains_identical_models() {
    let first = PredictionService::new(&seeded_settings());
    let second = PredictionService::new(&seeded_settings());

    for hour in 0..24 {
        let query = BrightnessQuery::new(hour as f64, 55.0, 35.0);
        assert_eq!(
            first.predict(&query).to_bits(),
            second.predict(&query).to_bits()
        );
    }
    assert_eq!(first.feature_importance(), second.feature_importance());
}

#[test]
fn failed_training_serves_heuristic_for_the_whole_day() {
    let params = BoostingParams {
        learning_rate: f64::NAN,
        ..BoostingParams::default()
    };
    let mut rng = StdRng::seed_from_u64(3);
    let samples = TrainingDataSynthesizer::new(4).generate(&mut rng);

    let service = PredictionService::from_samples(&samples, &params);

    assert!(!service.is_ready());
    assert!(!service.model_metrics().is_ready);
    for hour in 0..24 {
        let query = BrightnessQuery::new(hour as f64, 60.0, 40.0);
        assert_eq!(service.predict(&query), service.fallback_brightness(&query));
    }
}

#[test]
fn state_recomputes_snapshot_without_retraining() -> Result<(), AppError> {
    let service = Arc::new(PredictionService::new(&TrainingSettings {
        trees: 10,
        scenarios_per_hour: 20,
        seed: Some(5),
        ..TrainingSettings::default()
    }));
    let state = Arc::new(RwLock::new(AppState::new(Arc::clone(&service))));
    let receiver = {
        let guard = state.read().map_err(|_| AppError::StateLock)?;
        guard.subscribe_snapshot()
    };

    let quiet = {
        let mut guard = state.write().map_err(|_| AppError::StateLock)?;
        guard.apply_params(SimulationParams {
            traffic: 5.0,
            weather: 0.0,
            city: CitySize::Small,
            time: 23.0,
        })?
    };
    let stormy = {
        let mut guard = state.write().map_err(|_| AppError::StateLock)?;
        guard.apply_params(SimulationParams {
            traffic: 95.0,
            weather: 100.0,
            city: CitySize::Large,
            time: 23.0,
        })?
    };

    assert!(stormy.predicted_brightness >= quiet.predicted_brightness);
    assert!(stormy.energy.smart_kwh >= quiet.energy.smart_kwh);
    assert_eq!(receiver.borrow().as_ref(), Some(&stormy));

    let guard = state.read().map_err(|_| AppError::StateLock)?;
    assert!(Arc::ptr_eq(guard.service(), &service));
    Ok(())
}
