//! Residual-fitting gradient boosting over [`TreeNode`]s.
//!
//! Squared-error boosting with a constant learning rate: every round fits a
//! tree to `target - running_prediction` and adds a shrunken copy of its
//! output to the running prediction. The ensemble is immutable once built.

use crate::brightness::features::{
    FEATURE_COUNT, FEATURE_NAMES, FeatureVector, RawReading, encode,
};
use crate::brightness::model::BrightnessModel;
use crate::brightness::synth::TrainingSample;
use crate::brightness::tree::{SplitCounts, TreeBuilder, TreeNode};
use crate::brightness::{PredictionError, TrainingError};
use serde::Deserialize;
use tracing::{debug, info};

pub const DEFAULT_TREES: usize = 30;
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
pub const DEFAULT_MAX_DEPTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoostingParams {
    pub n_trees: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_TREES,
            learning_rate: DEFAULT_LEARNING_RATE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl BoostingParams {
    pub fn validate(&self) -> Result<(), TrainingError> {
        if self.n_trees == 0 {
            return Err(TrainingError::InvalidParams(
                "n_trees must be at least 1".to_string(),
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(TrainingError::InvalidParams(format!(
                "learning_rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct GradientBoostingEnsemble {
    trees: Vec<TreeNode>,
    learning_rate: f64,
    split_counts: SplitCounts,
}

impl GradientBoostingEnsemble {
    pub fn train(
        samples: &[TrainingSample],
        params: &BoostingParams,
    ) -> Result<Self, TrainingError> {
        params.validate()?;
        if samples.is_empty() {
            return Err(TrainingError::EmptyDataset);
        }
        for (index, sample) in samples.iter().enumerate() {
            if !sample.target.is_finite() {
                return Err(TrainingError::NonFiniteTarget { index });
            }
            if let Some(feature) = sample.features.iter().position(|v| !v.is_finite()) {
                return Err(TrainingError::NonFiniteFeature { index, feature });
            }
        }

        info!(
            samples = samples.len(),
            trees = params.n_trees,
            learning_rate = params.learning_rate,
            max_depth = params.max_depth,
            "Training brightness ensemble"
        );

        let features: Vec<FeatureVector> = samples.iter().map(|s| s.features).collect();
        let targets: Vec<f64> = samples.iter().map(|s| s.target).collect();
        let mut predictions = vec![0.0; samples.len()];
        let mut residuals = vec![0.0; samples.len()];
        let mut split_counts = [0; FEATURE_COUNT];
        let mut trees = Vec::with_capacity(params.n_trees);

        for round in 0..params.n_trees {
            for ((residual, target), prediction) in
                residuals.iter_mut().zip(&targets).zip(&predictions)
            {
                *residual = target - prediction;
            }

            let tree = TreeBuilder::new(&features, &residuals, params.max_depth)?
                .build(&mut split_counts);

            for (prediction, row) in predictions.iter_mut().zip(&features) {
                *prediction += params.learning_rate * tree.predict(row)?;
            }

            debug!(
                tree = round + 1,
                leaves = tree.leaf_count(),
                depth = tree.depth(),
                "Fitted boosting round"
            );
            trees.push(tree);
        }

        let mse = targets
            .iter()
            .zip(&predictions)
            .map(|(t, p)| (t - p).powi(2))
            .sum::<f64>()
            / targets.len() as f64;
        let dominant_feature = split_counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .max_by_key(|(_, count)| **count)
            .map_or("none", |(idx, _)| FEATURE_NAMES[idx]);
        info!(
            trees = trees.len(),
            splits = split_counts.iter().sum::<usize>(),
            dominant_feature,
            mse,
            "Brightness ensemble trained"
        );

        Ok(Self {
            trees,
            learning_rate: params.learning_rate,
            split_counts,
        })
    }

    /// Assemble an ensemble from existing trees, with no split accounting.
    pub fn from_trees(trees: Vec<TreeNode>, learning_rate: f64) -> Self {
        Self {
            trees,
            learning_rate,
            split_counts: [0; FEATURE_COUNT],
        }
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionError> {
        if self.trees.is_empty() {
            return Err(PredictionError::NotReady);
        }
        if let Some(feature) = features.iter().position(|v| !v.is_finite()) {
            return Err(PredictionError::NonFiniteFeature { feature });
        }

        let mut sum = 0.0;
        for tree in &self.trees {
            sum += self.learning_rate * tree.predict(features)?;
        }
        if !sum.is_finite() {
            return Err(PredictionError::NonFiniteOutput);
        }
        Ok(sum.clamp(0.0, 1.0))
    }

    pub fn trees(&self) -> &[TreeNode] {
        &self.trees
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn split_counts(&self) -> &SplitCounts {
        &self.split_counts
    }
}

impl BrightnessModel for GradientBoostingEnsemble {
    fn predict_brightness(&self, reading: &RawReading) -> Result<f64, PredictionError> {
        self.predict(&encode(reading))
    }

    fn name(&self) -> &'static str {
        "gradient_boosting"
    }
}
