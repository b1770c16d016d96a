use crate::analytics::{LightingSnapshot, SimulationParams};
use crate::api::responses::{
    ErrorCode, ErrorResponse, HealthStatus, HealthSuccessResponse, LightingSuccessResponse,
    ModelSuccessResponse, ParamsResponse, PredictSuccessResponse,
};
use crate::brightness::features::BrightnessQuery;
use crate::error::AppError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{error, info};

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
enum TimestampError {
    Format(time::error::Format),
}

impl fmt::Display for TimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampError::Format(err) => write!(f, "timestamp format error: {err}"),
        }
    }
}

/// Either a 2xx body of type `T` or an error body with its status.
pub enum ApiResponse<T> {
    Success { status: StatusCode, body: T },
    Error { status: StatusCode, body: ErrorResponse },
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            ApiResponse::Success { status, body } => (status, Json(body)).into_response(),
            ApiResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

impl<T> ApiResponse<T> {
    fn ok(body: T) -> Self {
        ApiResponse::Success {
            status: StatusCode::OK,
            body,
        }
    }
}

pub async fn get_health(State(state): State<Arc<RwLock<AppState>>>) -> impl IntoResponse {
    build_health_response(state, SystemTime::now())
}

pub async fn get_model(State(state): State<Arc<RwLock<AppState>>>) -> impl IntoResponse {
    build_model_response(state, SystemTime::now())
}

pub async fn get_lighting(State(state): State<Arc<RwLock<AppState>>>) -> impl IntoResponse {
    build_lighting_response(state, SystemTime::now())
}

pub async fn put_params(
    State(state): State<Arc<RwLock<AppState>>>,
    Json(params): Json<SimulationParams>,
) -> impl IntoResponse {
    build_params_response(state, params, SystemTime::now())
}

pub async fn post_predict(
    State(state): State<Arc<RwLock<AppState>>>,
    Json(query): Json<BrightnessQuery>,
) -> impl IntoResponse {
    build_predict_response(state, query, SystemTime::now())
}

fn build_health_response(
    state: Arc<RwLock<AppState>>,
    now: SystemTime,
) -> ApiResponse<HealthSuccessResponse> {
    let (ready, model) = match state.read() {
        Ok(guard) => {
            let service = guard.service();
            (service.is_ready(), service.active_model().name())
        }
        Err(_) => return internal_error("/api/health", "state lock poisoned while reading model"),
    };

    let timestamp = match format_timestamp(now) {
        Ok(formatted) => formatted,
        Err(_) => return internal_error("/api/health", "timestamp formatting failure"),
    };

    let status = if ready {
        HealthStatus::Ok
    } else {
        HealthStatus::Degraded
    };

    ApiResponse::ok(HealthSuccessResponse {
        status,
        model: model.to_string(),
        timestamp,
    })
}

fn build_model_response(
    state: Arc<RwLock<AppState>>,
    now: SystemTime,
) -> ApiResponse<ModelSuccessResponse> {
    let service = match state.read() {
        Ok(guard) => Arc::clone(guard.service()),
        Err(_) => return internal_error("/api/model", "state lock poisoned while reading model"),
    };

    let timestamp = match format_timestamp(now) {
        Ok(formatted) => formatted,
        Err(_) => return internal_error("/api/model", "timestamp formatting failure"),
    };

    ApiResponse::ok(ModelSuccessResponse {
        model: service.active_model().name().to_string(),
        metrics: service.model_metrics(),
        feature_importance: service.feature_importance(),
        timestamp,
    })
}

fn build_lighting_response(
    state: Arc<RwLock<AppState>>,
    now: SystemTime,
) -> ApiResponse<LightingSuccessResponse> {
    let snapshot = match state.read() {
        Ok(guard) => guard.snapshot().cloned(),
        Err(_) => {
            return internal_error("/api/lighting", "state lock poisoned while reading snapshot");
        }
    };

    match snapshot {
        Some(snapshot) => lighting_response("/api/lighting", snapshot),
        None => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::NoData,
            "No lighting snapshot available".to_string(),
            now,
            "/api/lighting",
        ),
    }
}

fn build_params_response(
    state: Arc<RwLock<AppState>>,
    params: SimulationParams,
    now: SystemTime,
) -> ApiResponse<LightingSuccessResponse> {
    let result = match state.write() {
        Ok(mut guard) => guard.apply_params_at(params, now),
        Err(_) => return internal_error("/api/params", "state lock poisoned while applying params"),
    };

    match result {
        Ok(snapshot) => {
            info!(
                traffic = params.traffic,
                weather = params.weather,
                time = params.time,
                city = ?params.city,
                brightness = snapshot.predicted_brightness,
                "Simulation parameters applied"
            );
            lighting_response("/api/params", snapshot)
        }
        Err(err @ AppError::InvalidParams { .. }) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::InvalidParams,
            err.to_string(),
            now,
            "/api/params",
        ),
        Err(AppError::StateLock) => {
            internal_error("/api/params", "state lock poisoned while applying params")
        }
    }
}

fn build_predict_response(
    state: Arc<RwLock<AppState>>,
    query: BrightnessQuery,
    now: SystemTime,
) -> ApiResponse<PredictSuccessResponse> {
    let service = match state.read() {
        Ok(guard) => Arc::clone(guard.service()),
        Err(_) => return internal_error("/api/predict", "state lock poisoned while reading model"),
    };

    let timestamp = match format_timestamp(now) {
        Ok(formatted) => formatted,
        Err(_) => return internal_error("/api/predict", "timestamp formatting failure"),
    };

    ApiResponse::ok(PredictSuccessResponse {
        brightness: service.predict(&query),
        model: service.active_model().name().to_string(),
        timestamp,
    })
}

fn lighting_response(
    route: &str,
    snapshot: LightingSnapshot,
) -> ApiResponse<LightingSuccessResponse> {
    let timestamp = match format_timestamp(snapshot.timestamp) {
        Ok(formatted) => formatted,
        Err(_) => return internal_error(route, "timestamp formatting failure"),
    };

    ApiResponse::ok(LightingSuccessResponse {
        params: ParamsResponse {
            traffic: snapshot.params.traffic,
            weather: snapshot.params.weather,
            city: snapshot.params.city,
            time: snapshot.params.time,
        },
        predicted_brightness: snapshot.predicted_brightness,
        model: snapshot.model.to_string(),
        hourly_brightness: snapshot.hourly.brightness,
        hourly_consumption_kwh: snapshot.hourly.consumption_kwh,
        energy: snapshot.energy,
        yearly_projections: snapshot.yearly,
        metrics: snapshot.metrics,
        feature_importance: snapshot.feature_importance,
        timestamp,
    })
}

fn error_response<T>(
    status: StatusCode,
    error_code: ErrorCode,
    error_message: String,
    now: SystemTime,
    route: &str,
) -> ApiResponse<T> {
    match format_timestamp(now) {
        Ok(timestamp) => ApiResponse::Error {
            status,
            body: ErrorResponse {
                error_code,
                error_message,
                timestamp,
            },
        },
        Err(_) => internal_error(route, "timestamp formatting failure"),
    }
}

fn internal_error<T>(route: &str, message: &str) -> ApiResponse<T> {
    error!(route = route, message = message, "Internal error while handling request");
    let formatted = format_timestamp(SystemTime::now()).unwrap_or_else(|err| {
        error!(error = %err, "Failed to format internal error timestamp");
        OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
    });

    ApiResponse::Error {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: ErrorResponse {
            error_code: ErrorCode::InternalError,
            error_message: INTERNAL_ERROR_MESSAGE.to_string(),
            timestamp: formatted,
        },
    }
}

fn format_timestamp(timestamp: SystemTime) -> Result<String, TimestampError> {
    let datetime = OffsetDateTime::from(timestamp);
    datetime.format(&Rfc3339).map_err(TimestampError::Format)
}
