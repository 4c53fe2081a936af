pub mod settings;

pub use settings::{ForecastSettings, MarketIndex};
