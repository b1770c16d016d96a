use crate::analytics::{CitySize, EnergyReport, YearlyProjection};
use crate::brightness::ModelMetrics;
use crate::brightness::importance::FeatureImportance;
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthSuccessResponse {
    pub status: HealthStatus,
    pub model: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ModelSuccessResponse {
    pub model: String,
    pub metrics: ModelMetrics,
    pub feature_importance: FeatureImportance,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PredictSuccessResponse {
    pub brightness: f64,
    pub model: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ParamsResponse {
    pub traffic: f64,
    pub weather: f64,
    pub city: CitySize,
    pub time: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LightingSuccessResponse {
    pub params: ParamsResponse,
    pub predicted_brightness: f64,
    pub model: String,
    pub hourly_brightness: Vec<f64>,
    pub hourly_consumption_kwh: Vec<f64>,
    pub energy: EnergyReport,
    pub yearly_projections: YearlyProjection,
    pub metrics: ModelMetrics,
    pub feature_importance: FeatureImportance,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ErrorResponse {
    pub error_code: ErrorCode,
    pub error_message: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NoData,
    InvalidParams,
    InternalError,
}
