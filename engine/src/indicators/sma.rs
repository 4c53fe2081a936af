// Simple Moving Average (SMA) indicator implementation
use super::IndicatorCalculator;
use shared::models::Bar;
use serde_json::Value;

/// Which bar field a moving average is taken over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceField {
    Close,
    Volume,
}

impl PriceField {
    pub fn extract(&self, bars: &[Bar]) -> Vec<f64> {
        match self {
            PriceField::Close => bars.iter().map(|b| b.close).collect(),
            PriceField::Volume => bars.iter().map(|b| b.volume).collect(),
        }
    }
}

pub struct Sma {
    name: String,
    period: usize,
    field: PriceField,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("MA{}", period),
            period,
            field: PriceField::Close,
        }
    }

    pub fn volume(period: usize) -> Self {
        Self {
            name: format!("VolumeMA{}", period),
            period,
            field: PriceField::Volume,
        }
    }
}

/// Trailing arithmetic mean over `window` values, inclusive of the current one.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let sum: f64 = values[i + 1 - window..=i].iter().sum();
            Some(sum / window as f64)
        })
        .collect()
}

impl IndicatorCalculator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        let field = match self.field {
            PriceField::Close => "close",
            PriceField::Volume => "volume",
        };
        serde_json::json!({ "period": self.period, "field": field })
    }

    fn calculate(&self, data: &[Bar]) -> Vec<Option<f64>> {
        rolling_mean(&self.field.extract(data), self.period)
    }
}
