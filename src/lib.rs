pub mod analytics;
pub mod api;
pub mod brightness;
pub mod config;
pub mod error;
pub mod state;
