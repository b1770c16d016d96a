use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid simulation parameter {field}: {value} (expected {expected})")]
    InvalidParams {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
    #[error("state lock poisoned")]
    StateLock,
}
