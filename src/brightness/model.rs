//! Brightness model trait shared by the trained ensemble and the heuristic fallback.

use crate::brightness::PredictionError;
use crate::brightness::features::RawReading;

/// A predictor mapping a resolved reading to a brightness in `[0, 1]`.
///
/// Implementations must be pure: the same reading always yields the same
/// result, and nothing is mutated by a prediction.
pub trait BrightnessModel: Send + Sync + std::fmt::Debug {
    fn predict_brightness(&self, reading: &RawReading) -> Result<f64, PredictionError>;

    /// Short identifier used in logs and API responses.
    fn name(&self) -> &'static str;
}
