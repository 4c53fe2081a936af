// Volume relative to its own moving average
use super::sma::{rolling_mean, PriceField};
use super::IndicatorCalculator;
use shared::models::Bar;
use serde_json::Value;

pub struct VolumeRatio {
    name: String,
    period: usize,
}

impl VolumeRatio {
    pub fn new(period: usize) -> Self {
        Self {
            name: "VolumeRatio".to_string(),
            period,
        }
    }
}

impl IndicatorCalculator for VolumeRatio {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, data: &[Bar]) -> Vec<Option<f64>> {
        let volumes = PriceField::Volume.extract(data);
        rolling_mean(&volumes, self.period)
            .into_iter()
            .zip(volumes.iter())
            .map(|(avg, &volume)| match avg {
                Some(avg) if avg != 0.0 => Some(volume / avg),
                _ => None,
            })
            .collect()
    }
}
