// Feature extraction from an indicator frame.
pub mod builder;

pub use builder::{extract_complete, extract_row, CompleteRows, TrainingSet};

pub const FEATURE_COUNT: usize = 10;

/// Positional feature names; the scaler and the model only ever see positions.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Open", "High", "Low", "Close", "Volume", "MA5", "MA20", "MA50", "RSI", "MACD",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn close(&self) -> f64 {
        self.0[3]
    }

    /// First non-finite entry, if any, as `(position, value)`.
    pub fn first_non_finite(&self) -> Option<(usize, f64)> {
        self.0.iter().copied().enumerate().find(|(_, v)| !v.is_finite())
    }
}
