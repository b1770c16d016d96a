use lumen_flow::analytics::SimulationParams;
use lumen_flow::brightness::PredictionService;
use lumen_flow::error::AppError;
use lumen_flow::state::AppState;
use lumen_flow::{api, config};
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use tracing::Level;

fn init_tracing(level: Level) {
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_default()?;
    init_tracing(config.log_level()?);
    tracing::info!(
        app = %config.app.name,
        config_path = config::DEFAULT_CONFIG_PATH,
        "lumen-flow starting"
    );

    // Training is CPU bound; keep it off the async workers.
    let settings = config.training.clone();
    let service = tokio::task::spawn_blocking(move || PredictionService::new(&settings)).await?;
    if !service.is_ready() {
        tracing::warn!("Serving heuristic brightness only");
    }

    let state = Arc::new(RwLock::new(AppState::new(Arc::new(service))));
    {
        let mut guard = state.write().map_err(|_| AppError::StateLock)?;
        let snapshot = guard.apply_params(SimulationParams::default())?;
        tracing::info!(
            brightness = snapshot.predicted_brightness,
            load_decrease_percent = snapshot.energy.load_decrease_percent,
            "Initial lighting snapshot computed"
        );
    }

    let app = api::router(Arc::clone(&state));
    let port = config.server_port();
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
