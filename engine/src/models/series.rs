// Contract checks for series handed to the engine by a data source.
use shared::models::{Bar, TimeSeries};

use crate::error::{EngineError, Result};

/// Checks that every numeric field is finite and timestamps strictly increase.
pub fn validate_series(series: &TimeSeries) -> Result<()> {
    for (i, bar) in series.bars.iter().enumerate() {
        let fields = [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
            ("volume", bar.volume),
        ];
        if let Some((field, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(EngineError::MarketDataError(format!(
                "{}: bar {} has non-finite {} ({})",
                series.symbol, i, field, value
            )));
        }
    }
    if let Some(i) = series.bars.windows(2).position(|w| w[0].timestamp >= w[1].timestamp) {
        return Err(EngineError::MarketDataError(format!(
            "{}: bar {} at {} is not after {}",
            series.symbol,
            i + 1,
            series.bars[i + 1].timestamp,
            series.bars[i].timestamp
        )));
    }
    Ok(())
}

/// Builds a validated series; the symbol is upper-cased.
pub fn new_series(symbol: &str, bars: Vec<Bar>) -> Result<TimeSeries> {
    let series = TimeSeries {
        symbol: symbol.trim().to_uppercase(),
        bars,
    };
    validate_series(&series)?;
    Ok(series)
}
