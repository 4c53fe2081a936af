// Computes the fixed indicator set for a series in one pass per column.
use super::{Bollinger, IndicatorCalculator, Macd, MacdSignal, Rsi, Sma, VolumeRatio};
use shared::models::{IndicatorColumn, IndicatorFrame, IndicatorRow, TimeSeries};

/// Slot in `IndicatorRow` a calculator's output is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Ma5,
    Ma20,
    Ma50,
    Rsi14,
    Macd,
    Signal,
    BollingerUpper,
    BollingerLower,
    VolumeMa20,
    VolumeRatio,
}

impl Column {
    fn write(self, row: &mut IndicatorRow, value: Option<f64>) {
        let slot = match self {
            Column::Ma5 => &mut row.ma5,
            Column::Ma20 => &mut row.ma20,
            Column::Ma50 => &mut row.ma50,
            Column::Rsi14 => &mut row.rsi14,
            Column::Macd => &mut row.macd,
            Column::Signal => &mut row.signal,
            Column::BollingerUpper => &mut row.bollinger_upper,
            Column::BollingerLower => &mut row.bollinger_lower,
            Column::VolumeMa20 => &mut row.volume_ma20,
            Column::VolumeRatio => &mut row.volume_ratio,
        };
        // Non-finite results are treated as undefined cells.
        *slot = value.filter(|v| v.is_finite());
    }
}

/// Stateless indicator pipeline. `compute` never mutates its input and never fails:
/// short input simply leaves the longer-window columns undefined.
pub struct IndicatorEngine {
    calculators: Vec<(Column, Box<dyn IndicatorCalculator>)>,
}

impl IndicatorEngine {
    pub fn new() -> Self {
        let calculators: Vec<(Column, Box<dyn IndicatorCalculator>)> = vec![
            (Column::Ma5, Box::new(Sma::new(5))),
            (Column::Ma20, Box::new(Sma::new(20))),
            (Column::Ma50, Box::new(Sma::new(50))),
            (Column::Rsi14, Box::new(Rsi::new(14))),
            (Column::Macd, Box::new(Macd::default())),
            (Column::Signal, Box::new(MacdSignal::default())),
            (Column::BollingerUpper, Box::new(Bollinger::upper(20, 2.0))),
            (Column::BollingerLower, Box::new(Bollinger::lower(20, 2.0))),
            (Column::VolumeMa20, Box::new(Sma::volume(20))),
            (Column::VolumeRatio, Box::new(VolumeRatio::new(20))),
        ];
        Self { calculators }
    }

    /// Names and parameters of every column this engine produces, in row order.
    pub fn columns(&self) -> Vec<IndicatorColumn> {
        self.calculators
            .iter()
            .map(|(_, calc)| IndicatorColumn {
                name: calc.name().to_string(),
                parameters: calc.parameters(),
            })
            .collect()
    }

    pub fn compute(&self, series: &TimeSeries) -> IndicatorFrame {
        let mut rows = vec![IndicatorRow::default(); series.len()];
        if !series.is_empty() {
            for (column, calc) in &self.calculators {
                let values = calc.calculate(&series.bars);
                debug_assert_eq!(
                    values.len(),
                    rows.len(),
                    "{} returned a misaligned column",
                    calc.name()
                );
                for (row, value) in rows.iter_mut().zip(values) {
                    column.write(row, value);
                }
            }
        }
        tracing::debug!(symbol = %series.symbol, bars = series.len(), "Computed indicator frame");

        IndicatorFrame {
            symbol: series.symbol.clone(),
            bars: series.bars.clone(),
            rows,
            columns: self.columns(),
        }
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new()
    }
}
