//! Greedy regression tree built by exhaustive variance-reduction search.
//!
//! Each node scans every feature, sorts the node's samples by that feature
//! and sweeps prefix sums over the sorted order, so scoring all midpoint
//! thresholds costs `O(n log n)` per feature rather than a full pass per
//! candidate.

use crate::brightness::{PredictionError, TrainingError};
use crate::brightness::features::{FEATURE_COUNT, FeatureVector};

/// Nodes with fewer samples than this become leaves.
pub const MIN_SAMPLES_SPLIT: usize = 5;

/// Splits must reduce variance by more than this to be taken.
pub const MIN_VARIANCE_REDUCTION: f64 = 1e-12;

/// Number of times each feature was chosen as a split during one training run.
pub type SplitCounts = [usize; FEATURE_COUNT];

#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    pub fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionError> {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features
                        .get(*feature)
                        .ok_or(PredictionError::MalformedTree { feature: *feature })?;
                    node = if *value <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Depth of the deepest leaf; a lone leaf has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    score: f64,
}

/// Builds one tree over borrowed, index-aligned features and targets.
#[derive(Debug)]
pub struct TreeBuilder<'a> {
    features: &'a [FeatureVector],
    targets: &'a [f64],
    max_depth: usize,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(
        features: &'a [FeatureVector],
        targets: &'a [f64],
        max_depth: usize,
    ) -> Result<Self, TrainingError> {
        if features.len() != targets.len() {
            return Err(TrainingError::LengthMismatch {
                features: features.len(),
                targets: targets.len(),
            });
        }
        Ok(Self {
            features,
            targets,
            max_depth,
        })
    }

    /// Build the tree, adding one count per chosen split to `split_counts`.
    pub fn build(&self, split_counts: &mut SplitCounts) -> TreeNode {
        let indices: Vec<usize> = (0..self.targets.len()).collect();
        self.build_node(&indices, 0, split_counts)
    }

    fn build_node(
        &self,
        indices: &[usize],
        depth: usize,
        split_counts: &mut SplitCounts,
    ) -> TreeNode {
        let leaf = || TreeNode::Leaf {
            value: self.mean(indices),
        };

        if depth >= self.max_depth || indices.len() < MIN_SAMPLES_SPLIT {
            return leaf();
        }

        let Some(split) = self.find_best_split(indices) else {
            return leaf();
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&idx| self.features[idx][split.feature] <= split.threshold);

        if left.is_empty() || right.is_empty() {
            return leaf();
        }

        split_counts[split.feature] += 1;

        TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.build_node(&left, depth + 1, split_counts)),
            right: Box::new(self.build_node(&right, depth + 1, split_counts)),
        }
    }

    /// Highest-scoring split; ties keep the earliest (feature, threshold).
    ///
    /// Prefix sums accumulate in each feature's own sort order, so two
    /// features cutting the same partition can differ in the last bits.
    /// Scores within [`TIE_TOLERANCE`] of the best count as ties.
    fn find_best_split(&self, indices: &[usize]) -> Option<SplitCandidate> {
        let n = indices.len() as f64;
        let total_sum: f64 = indices.iter().map(|&idx| self.targets[idx]).sum();
        let total_sq: f64 = indices.iter().map(|&idx| self.targets[idx].powi(2)).sum();

        if self.variance(indices) <= MIN_VARIANCE_REDUCTION {
            return None;
        }
        let parent_sse = sum_squared_error(total_sum, total_sq, n);

        let mut best: Option<SplitCandidate> = None;
        let mut column: Vec<(f64, f64)> = Vec::with_capacity(indices.len());

        for feature in 0..FEATURE_COUNT {
            column.clear();
            column.extend(
                indices
                    .iter()
                    .map(|&idx| (self.features[idx][feature], self.targets[idx])),
            );
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for i in 0..column.len() - 1 {
                let (value, target) = column[i];
                left_sum += target;
                left_sq += target * target;

                let next = column[i + 1].0;
                if next == value {
                    continue;
                }

                let left_n = (i + 1) as f64;
                let right_n = n - left_n;
                let left_sse = sum_squared_error(left_sum, left_sq, left_n);
                let right_sse =
                    sum_squared_error(total_sum - left_sum, total_sq - left_sq, right_n);
                // Var(parent) - nL/n Var(L) - nR/n Var(R), with Var = SSE / count.
                let score = (parent_sse - left_sse - right_sse) / n;

                if score <= MIN_VARIANCE_REDUCTION {
                    continue;
                }
                if best.is_none_or(|current| beats(score, current.score)) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: (value + next) / 2.0,
                        score,
                    });
                }
            }
        }

        best
    }

    fn mean(&self, indices: &[usize]) -> f64 {
        if indices.is_empty() {
            return 0.0;
        }
        indices.iter().map(|&idx| self.targets[idx]).sum::<f64>() / indices.len() as f64
    }

    fn variance(&self, indices: &[usize]) -> f64 {
        if indices.is_empty() {
            return 0.0;
        }
        let mean = self.mean(indices);
        indices
            .iter()
            .map(|&idx| (self.targets[idx] - mean).powi(2))
            .sum::<f64>()
            / indices.len() as f64
    }
}

/// Relative slack under which two split scores are considered equal.
pub const TIE_TOLERANCE: f64 = 1e-12;

fn beats(score: f64, best: f64) -> bool {
    score > best + TIE_TOLERANCE * best.abs().max(1.0)
}

fn sum_squared_error(sum: f64, sum_sq: f64, count: f64) -> f64 {
    if count <= 0.0 {
        return 0.0;
    }
    (sum_sq - sum * sum / count).max(0.0)
}
