// Latest-price snapshot derived from a daily series
use shared::models::{Quote, TimeSeries};

use crate::error::{EngineError, Result};

/// Bars treated as one trading year for the 52-week statistics.
pub const TRADING_YEAR_BARS: usize = 252;

pub fn build_quote(series: &TimeSeries) -> Result<Quote> {
    let last = series
        .last()
        .ok_or_else(|| EngineError::EmptySeries(series.symbol.clone()))?;
    let n = series.len();
    let previous_close = if n > 1 { series.bars[n - 2].close } else { last.close };
    let change = last.close - previous_close;
    let change_percent = if previous_close != 0.0 { change / previous_close * 100.0 } else { 0.0 };

    let year = &series.bars[n.saturating_sub(TRADING_YEAR_BARS)..];
    let week_52_high = year.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let week_52_low = year.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let avg_volume = year.iter().map(|b| b.volume).sum::<f64>() / year.len() as f64;

    Ok(Quote {
        symbol: series.symbol.clone(),
        current_price: last.close,
        previous_close,
        change,
        change_percent,
        volume: last.volume.max(0.0) as u64,
        avg_volume: avg_volume.max(0.0) as u64,
        week_52_high,
        week_52_low,
        as_of: last.date(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::bars_from_closes;

    #[test]
    fn test_quote_from_series() {
        let mut closes: Vec<f64> = (0..300).map(|i| 50.0 + (i % 40) as f64).collect();
        closes[0] = 500.0; // outside the trailing year
        let series = TimeSeries {
            symbol: "XYZ".to_string(),
            bars: bars_from_closes(&closes),
        };
        let quote = build_quote(&series).unwrap();

        assert_eq!(quote.current_price, closes[299]);
        assert_eq!(quote.previous_close, closes[298]);
        assert_eq!(quote.change, closes[299] - closes[298]);
        assert_eq!(quote.week_52_high, 89.0);
        assert_eq!(quote.week_52_low, 50.0);
        assert_eq!(quote.avg_volume, 1000);
    }

    #[test]
    fn test_single_bar_has_no_change() {
        let series = TimeSeries {
            symbol: "ONE".to_string(),
            bars: bars_from_closes(&[10.0]),
        };
        let quote = build_quote(&series).unwrap();
        assert_eq!(quote.previous_close, 10.0);
        assert_eq!(quote.change, 0.0);
        assert_eq!(quote.change_percent, 0.0);
    }

    #[test]
    fn test_empty_series_is_an_error() {
        let err = build_quote(&TimeSeries::default()).unwrap_err();
        assert!(matches!(err, EngineError::EmptySeries(_)));
    }
}
