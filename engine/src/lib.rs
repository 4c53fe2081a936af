// Engine library root: indicator pipeline, feature extraction and next-close forecasting.

pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod indicators;
pub mod model;
pub mod models;
pub mod services;

pub use error::{EngineError, Result};
pub use services::PredictionService;
