// Relative Strength Index (RSI) indicator implementation
use super::IndicatorCalculator;
use shared::models::Bar;
use serde_json::Value;

/// RSI from simple means of gains and losses over the trailing `period` close
/// changes. The first `period` bars are undefined.
pub struct Rsi {
    name: String,
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("RSI{}", period),
            period,
        }
    }
}

impl IndicatorCalculator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, data: &[Bar]) -> Vec<Option<f64>> {
        if data.len() <= self.period || self.period == 0 {
            return vec![None; data.len()];
        }

        // changes[j] is close[j + 1] - close[j]
        let changes: Vec<f64> = data.windows(2).map(|w| w[1].close - w[0].close).collect();

        let mut results = vec![None; self.period];
        for i in self.period..data.len() {
            let window = &changes[i - self.period..i];
            let gain = window.iter().map(|c| c.max(0.0)).sum::<f64>() / self.period as f64;
            let loss = window.iter().map(|c| (-c).max(0.0)).sum::<f64>() / self.period as f64;

            if loss == 0.0 {
                results.push(Some(100.0)); // Avoid division by zero; if no losses, RSI is 100
            } else {
                let rs = gain / loss;
                results.push(Some(100.0 - (100.0 / (1.0 + rs))));
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::bars_from_closes;

    #[test]
    fn test_rsi_known_window() {
        // Seven gains of 1 and seven losses of 1 -> RS = 1 -> RSI = 50
        let mut closes = vec![100.0];
        for i in 0..14 {
            let last = *closes.last().unwrap();
            closes.push(if i % 2 == 0 { last + 1.0 } else { last - 1.0 });
        }
        let results = Rsi::new(14).calculate(&bars_from_closes(&closes));
        assert_eq!(results.len(), 15);
        assert!(results[..14].iter().all(|v| v.is_none()));
        assert!((results[14].unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let bars = bars_from_closes(&[1.0; 14]);
        assert_eq!(Rsi::new(14).calculate(&bars), vec![None; 14]);
    }

    #[test]
    fn test_rsi_all_gains() {
        let closes: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let results = Rsi::new(14).calculate(&bars_from_closes(&closes));
        for i in 0..14 {
            assert_eq!(results[i], None);
        }
        for i in 14..20 {
            assert_eq!(results[i], Some(100.0));
        }
    }

    #[test]
    fn test_rsi_all_losses() {
        let closes: Vec<f64> = (1..=20).map(|i| 20.0 - i as f64).collect();
        let results = Rsi::new(14).calculate(&bars_from_closes(&closes));
        for i in 14..20 {
            assert_eq!(results[i], Some(0.0));
        }
    }

    #[test]
    fn test_rsi_flat_prices_is_100() {
        let results = Rsi::new(14).calculate(&bars_from_closes(&[50.0; 30]));
        assert!(results[14..].iter().all(|v| *v == Some(100.0)));
    }

    #[test]
    fn test_rsi_bounded() {
        let closes: Vec<f64> = (0..200)
            .map(|i| 100.0 + ((i * 7919) % 23) as f64 - 11.0 + (i as f64 * 0.3).sin() * 5.0)
            .collect();
        let results = Rsi::new(14).calculate(&bars_from_closes(&closes));
        for value in results.into_iter().flatten() {
            assert!((0.0..=100.0).contains(&value), "RSI out of range: {}", value);
        }
    }
}
