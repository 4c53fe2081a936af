// Technical indicators module
pub mod bollinger;
pub mod ema;
pub mod engine;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod volume;

pub use bollinger::{Band, Bollinger};
pub use ema::ema_values;
pub use engine::IndicatorEngine;
pub use macd::{Macd, MacdSignal};
pub use rsi::Rsi;
pub use sma::{PriceField, Sma};
pub use volume::VolumeRatio;

use shared::models::Bar;
use serde_json::Value;

// Common trait for all indicators
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;
    fn parameters(&self) -> Value; // Parameters used for this indicator instance
    /// One entry per bar; `None` where the indicator has no value yet.
    fn calculate(&self, data: &[Bar]) -> Vec<Option<f64>>;
}
