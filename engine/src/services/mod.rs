// Orchestration on top of the indicator engine and the predictor.
pub mod history;
pub mod market_summary;
pub mod prediction_service;
pub mod quote;

pub use history::build_history;
pub use market_summary::build_market_summary;
pub use prediction_service::{PredictionService, DISCLAIMER};
pub use quote::build_quote;
