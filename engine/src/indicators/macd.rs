// Moving Average Convergence Divergence (MACD) and its signal line
use super::ema::ema_values;
use super::IndicatorCalculator;
use shared::models::Bar;
use serde_json::Value;

/// `EMA(fast) - EMA(slow)` of close. Defined from the first bar, but early values
/// carry little information until roughly `slow` bars have been seen.
pub fn macd_line(data: &[Bar], fast: usize, slow: usize) -> Vec<f64> {
    let closes: Vec<f64> = data.iter().map(|b| b.close).collect();
    let fast_ema = ema_values(&closes, fast);
    let slow_ema = ema_values(&closes, slow);
    fast_ema.iter().zip(slow_ema.iter()).map(|(f, s)| f - s).collect()
}

pub struct Macd {
    name: String,
    fast: usize,
    slow: usize,
}

impl Macd {
    pub fn new(fast: usize, slow: usize) -> Self {
        Self {
            name: "MACD".to_string(),
            fast,
            slow,
        }
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new(12, 26)
    }
}

impl IndicatorCalculator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "fast": self.fast, "slow": self.slow })
    }

    fn calculate(&self, data: &[Bar]) -> Vec<Option<f64>> {
        macd_line(data, self.fast, self.slow).into_iter().map(Some).collect()
    }
}

/// EMA of the MACD line.
pub struct MacdSignal {
    name: String,
    fast: usize,
    slow: usize,
    signal: usize,
}

impl MacdSignal {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        Self {
            name: format!("Signal({})", signal),
            fast,
            slow,
            signal,
        }
    }
}

impl Default for MacdSignal {
    fn default() -> Self {
        Self::new(12, 26, 9)
    }
}

impl IndicatorCalculator for MacdSignal {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "fast": self.fast, "slow": self.slow, "signal": self.signal })
    }

    fn calculate(&self, data: &[Bar]) -> Vec<Option<f64>> {
        let line = macd_line(data, self.fast, self.slow);
        ema_values(&line, self.signal).into_iter().map(Some).collect()
    }
}
