// Bollinger Bands: moving average plus/minus k sample standard deviations
use super::sma::rolling_mean;
use super::IndicatorCalculator;
use shared::models::Bar;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Upper,
    Lower,
}

pub struct Bollinger {
    name: String,
    period: usize,
    k: f64,
    band: Band,
}

impl Bollinger {
    pub fn upper(period: usize, k: f64) -> Self {
        Self {
            name: "BollingerUpper".to_string(),
            period,
            k,
            band: Band::Upper,
        }
    }

    pub fn lower(period: usize, k: f64) -> Self {
        Self {
            name: "BollingerLower".to_string(),
            period,
            k,
            band: Band::Lower,
        }
    }
}

/// Sample (n - 1) standard deviation over the trailing window.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; values.len()];
    }
    rolling_mean(values, window)
        .iter()
        .enumerate()
        .map(|(i, mean)| {
            let mean = (*mean)?;
            let sum_sq: f64 = values[i + 1 - window..=i].iter().map(|v| (v - mean).powi(2)).sum();
            Some((sum_sq / (window - 1) as f64).sqrt())
        })
        .collect()
}

impl IndicatorCalculator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period, "k": self.k })
    }

    fn calculate(&self, data: &[Bar]) -> Vec<Option<f64>> {
        let closes: Vec<f64> = data.iter().map(|b| b.close).collect();
        let means = rolling_mean(&closes, self.period);
        let stds = rolling_std(&closes, self.period);
        means
            .into_iter()
            .zip(stds)
            .map(|(mean, std)| {
                let (mean, std) = (mean?, std?);
                Some(match self.band {
                    Band::Upper => mean + self.k * std,
                    Band::Lower => mean - self.k * std,
                })
            })
            .collect()
    }
}
