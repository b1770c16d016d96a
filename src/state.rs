use crate::analytics::{LightingSnapshot, SimulationParams};
use crate::brightness::PredictionService;
use crate::error::AppError;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::watch;

#[derive(Debug)]
pub struct AppState {
    service: Arc<PredictionService>,
    params: SimulationParams,
    snapshot: Option<LightingSnapshot>,
    snapshot_tx: watch::Sender<Option<LightingSnapshot>>,
}

impl AppState {
    pub fn new(service: Arc<PredictionService>) -> Self {
        let (snapshot_tx, _snapshot_rx) = watch::channel(None);
        Self {
            service,
            params: SimulationParams::default(),
            snapshot: None,
            snapshot_tx,
        }
    }

    pub fn service(&self) -> &Arc<PredictionService> {
        &self.service
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn snapshot(&self) -> Option<&LightingSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn subscribe_snapshot(&self) -> watch::Receiver<Option<LightingSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// Validate and adopt new parameters, then re-run inference. The model
    /// itself is never retrained here.
    pub fn apply_params(&mut self, params: SimulationParams) -> Result<LightingSnapshot, AppError> {
        self.apply_params_at(params, SystemTime::now())
    }

    pub fn apply_params_at(
        &mut self,
        params: SimulationParams,
        timestamp: SystemTime,
    ) -> Result<LightingSnapshot, AppError> {
        params.validate()?;
        let snapshot = LightingSnapshot::build(&self.service, params, timestamp);
        self.params = params;
        self.snapshot = Some(snapshot.clone());
        self.snapshot_tx.send_replace(Some(snapshot.clone()));
        Ok(snapshot)
    }
}
