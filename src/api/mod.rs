use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post, put};
use std::sync::{Arc, RwLock};

pub mod handlers;
pub mod responses;

pub fn router(state: Arc<RwLock<AppState>>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::get_health))
        .route("/api/model", get(handlers::get_model))
        .route("/api/lighting", get(handlers::get_lighting))
        .route("/api/params", put(handlers::put_params))
        .route("/api/predict", post(handlers::post_predict))
        .with_state(state)
}
